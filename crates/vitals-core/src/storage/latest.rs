/// Most recent scalar of each signal, kept outside the buffers so gauges can
/// redraw without scanning history.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LatestValues {
    pub bpm: f32,
    pub spo2: f32,
}

impl LatestValues {
    /// Record the values of the reading pair that just arrived.
    ///
    /// Non-positive saturation is stored as 0 ("no signal").
    pub fn update(&mut self, bpm: f32, spo2: f32) {
        self.bpm = bpm;
        self.spo2 = if spo2 > 0.0 { spo2 } else { 0.0 };
    }
}
