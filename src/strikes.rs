// ATM-centered strike windowing: the full NSE chain runs to hundreds of
// strikes, while analysis (and anything feeding an LLM context) only wants
// the handful around the money.

/// Strike minimizing |strike - target|. Ties go to the first occurrence in
/// ascending order, i.e. the lower strike. Returns `None` on an empty list.
pub fn find_closest_strike(strikes: &[f64], target: f64) -> Option<f64> {
    let mut sorted = strikes.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mut closest: Option<f64> = None;
    let mut min_distance = f64::MAX;

    for &strike in &sorted {
        let distance = (strike - target).abs();
        if distance < min_distance {
            min_distance = distance;
            closest = Some(strike);
        }
    }

    closest
}

/// Contiguous window of strikes centered on `center`, `radius` entries to
/// each side, clamped at the array edges (so the result may be shorter
/// than 2*radius+1 near either end). `center` is located by proximity, so
/// a center that is not an exact member still yields a sensible window.
pub fn window_around(strikes: &[f64], center: f64, radius: usize) -> Vec<f64> {
    let mut sorted = strikes.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    sorted.dedup();

    if sorted.is_empty() {
        return sorted;
    }

    let center_idx = sorted
        .iter()
        .enumerate()
        .min_by(|(_, a), (_, b)| {
            let da = (*a - center).abs();
            let db = (*b - center).abs();
            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|(idx, _)| idx)
        .unwrap_or(0);

    let start = center_idx.saturating_sub(radius);
    let end = (center_idx + radius + 1).min(sorted.len());

    sorted[start..end].to_vec()
}
