// crates/neoncut-media/src/capture.rs
//
// Fixed-rate capture gate. The frame loop runs at display rate; the
// recorder wants exactly `fps` frames per timeline second. Each call reports
// how many frame slots the playhead has crossed since the last call, so a
// stalled frame repeats the current surface instead of shortening the file.

/// Frames needed to cover `duration` seconds at `fps`. Never zero.
pub fn frame_count_for(duration: f64, fps: u32) -> u32 {
    if !(duration > 0.0) || fps == 0 {
        return 1;
    }
    let n = (duration * fps as f64 - 1e-9).ceil();
    n.clamp(1.0, u32::MAX as f64) as u32
}

#[derive(Clone, Debug, PartialEq)]
pub struct CaptureStream {
    fps:     u32,
    emitted: u32,
    limit:   u32,
}

impl CaptureStream {
    pub fn new(fps: u32, limit: u32) -> Self {
        Self { fps: fps.max(1), emitted: 0, limit }
    }

    /// Frames whose timestamps `i / fps` lie at or before `t` and have not
    /// been emitted yet, capped at the budget. Marks them emitted.
    pub fn frames_due(&mut self, t: f64) -> u32 {
        let crossed = (t.max(0.0) * self.fps as f64).floor() as u64 + 1;
        let target = crossed.min(self.limit as u64) as u32;
        let due = target.saturating_sub(self.emitted);
        self.emitted += due;
        due
    }

    pub fn emitted(&self) -> u32 {
        self.emitted
    }

    pub fn remaining(&self) -> u32 {
        self.limit - self.emitted
    }

    pub fn is_complete(&self) -> bool {
        self.emitted >= self.limit
    }
}
