/// Average of every present score, rounded to one decimal.
/// `None` when no source carries a score.
pub fn aggregate_rating<I>(scores: I) -> Option<f64>
where
    I: IntoIterator<Item = Option<f64>>,
{
    let (sum, count) = scores
        .into_iter()
        .flatten()
        .filter(|s| s.is_finite())
        .fold((0.0, 0u32), |(sum, count), s| (sum + s, count + 1));

    if count == 0 {
        return None;
    }
    Some(round_one_decimal(sum / f64::from(count)))
}

/// Half-away-from-zero rounding to one decimal place.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
