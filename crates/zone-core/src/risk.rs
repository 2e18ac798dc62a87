//! Temperature to display-probability mapping for live zones.

/// Piecewise-linear bands: `(temp_lo, temp_hi, prob_lo, prob_hi)`.
///
/// Interpolation saturates at the band edges. The first band starts at 20°C
/// so anything cooler pins to the 0.05 floor; the last saturates at 45°C.
const BANDS: [(f64, f64, f64, f64); 5] = [
    (20.0, 30.0, 0.05, 0.3),
    (30.0, 35.0, 0.3, 0.5),
    (35.0, 38.0, 0.5, 0.7),
    (38.0, 41.0, 0.7, 0.9),
    (41.0, 45.0, 0.9, 1.0),
];

/// Map a surface temperature (°C) to a probability in `[0.05, 1.0]`.
pub fn temperature_to_probability(celsius: f64) -> f64 {
    if celsius.is_nan() {
        return BANDS[0].2;
    }
    let band = BANDS
        .iter()
        .find(|(_, hi, _, _)| celsius < *hi)
        .unwrap_or(&BANDS[BANDS.len() - 1]);
    let (t_lo, t_hi, p_lo, p_hi) = *band;
    let t = ((celsius - t_lo) / (t_hi - t_lo)).clamp(0.0, 1.0);
    p_lo + t * (p_hi - p_lo)
}
