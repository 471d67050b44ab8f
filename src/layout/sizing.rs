//! Proportional size distribution for the children of a row or column.
//!
//! Children carry relative sizes (percentages along the container's primary
//! axis) that may be unset. `distribute` turns them into a complete set that
//! sums to 100, `absolute_sizes` converts the result into whole pixels, and
//! `respect_min_item_size` nudges percentages so no child drops below its
//! minimum pixel size when the siblings have room to give.

/// Normalise relative sizes so they sum to 100.
///
/// - Sizes that already round to 100 are returned unchanged.
/// - Below 100, unset sizes split the remainder equally; when everything is
///   set the sizes are scaled up proportionally.
/// - Above 100, unset sizes count as 50 each and everything is scaled down.
///
/// Unset sizes next to a set total that already rounds to 100 take the
/// scaling path too, so every child comes out with a defined size.
pub fn distribute(sizes: &[Option<f64>]) -> Vec<f64> {
    if sizes.is_empty() {
        return Vec::new();
    }

    let mut total: f64 = sizes.iter().flatten().sum();
    let unset = sizes.iter().filter(|s| s.is_none()).count();

    if total.round() == 100.0 && unset == 0 {
        return sizes.iter().map(|s| s.unwrap_or_default()).collect();
    }

    if total.round() < 100.0 && unset > 0 {
        let share = (100.0 - total) / unset as f64;
        return sizes.iter().map(|s| s.unwrap_or(share)).collect();
    }

    let mut resolved: Vec<f64> = sizes.iter().map(|s| s.unwrap_or(50.0)).collect();
    total += 50.0 * unset as f64;

    if total <= 0.0 {
        let share = 100.0 / resolved.len() as f64;
        resolved.iter_mut().for_each(|s| *s = share);
        return resolved;
    }

    for size in resolved.iter_mut() {
        *size = *size / total * 100.0;
    }
    resolved
}

/// Pixel extent left for children once the splitters between them are
/// subtracted.
pub fn content_extent(total: u16, child_count: usize, splitter: u16) -> u16 {
    let splitters = child_count.saturating_sub(1) as u32 * u32::from(splitter);
    u32::from(total).saturating_sub(splitters) as u16
}

/// Convert relative sizes into pixels along an axis of `total` pixels.
///
/// Each share is floored; the pixels lost to rounding are handed out one at a
/// time to the leading children so the result always sums to `total` when the
/// relative sizes sum to 100.
pub fn absolute_sizes(relative: &[f64], total: u16) -> Vec<u16> {
    let mut sizes: Vec<u16> = relative
        .iter()
        .map(|rel| {
            (f64::from(total) * rel / 100.0)
                .floor()
                .clamp(0.0, f64::from(total)) as u16
        })
        .collect();
    let assigned: u32 = sizes.iter().map(|s| u32::from(*s)).sum();
    let additional = u32::from(total).saturating_sub(assigned) as usize;
    for size in sizes.iter_mut().take(additional) {
        *size = size.saturating_add(1);
    }
    sizes
}

/// Shift space from children above their minimum towards children below it.
///
/// The deficit of every undersized child is summed (`under`) together with
/// the slack of every child above its minimum (`over`). When there is no
/// deficit, or the slack cannot cover it, nothing changes. Otherwise each
/// child with slack gives up the same fraction of it (rounded to whole
/// pixels), the rounding leftover is charged to the last child, and the
/// corrected pixel sizes are written back as percentages.
///
/// Returns whether `relative` was rewritten.
pub fn respect_min_item_size(relative: &mut [f64], total: u16, min_sizes: &[u16]) -> bool {
    if relative.len() <= 1 || total == 0 || min_sizes.len() != relative.len() {
        return false;
    }

    let absolute = absolute_sizes(relative, total);
    let mut entries = Vec::with_capacity(absolute.len());
    let mut over_min = Vec::new();
    let mut total_under = 0.0;
    let mut total_over = 0.0;

    for (idx, (&size, &min)) in absolute.iter().zip(min_sizes).enumerate() {
        let size = f64::from(size);
        let min = f64::from(min);
        if size < min {
            total_under += min - size;
            entries.push(min);
        } else {
            total_over += size - min;
            entries.push(size);
            over_min.push(idx);
        }
    }

    if total_under == 0.0 || total_under > total_over {
        return false;
    }

    let reduce = total_under / total_over;
    let mut remaining = total_under;
    for idx in over_min {
        let reduced = ((entries[idx] - f64::from(min_sizes[idx])) * reduce).round();
        remaining -= reduced;
        entries[idx] -= reduced;
    }
    if remaining != 0.0
        && let Some(last) = entries.last_mut()
    {
        *last -= remaining;
    }

    let total = f64::from(total);
    for (rel, width) in relative.iter_mut().zip(entries) {
        *rel = width * 100.0 / total;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(actual: &[f64], expected: &[f64]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} vs {expected:?}");
        for (a, e) in actual.iter().zip(expected) {
            assert!((a - e).abs() < 1e-9, "{actual:?} vs {expected:?}");
        }
    }

    #[test]
    fn sizes_summing_to_100_are_untouched() {
        approx(&distribute(&[Some(25.0), Some(75.0)]), &[25.0, 75.0]);
        approx(
            &distribute(&[Some(33.33), Some(33.33), Some(33.34)]),
            &[33.33, 33.33, 33.34],
        );
    }

    #[test]
    fn unset_sizes_share_the_remainder() {
        approx(&distribute(&[Some(30.0), None, None]), &[30.0, 35.0, 35.0]);
        approx(&distribute(&[None, None, None, None]), &[25.0; 4]);
    }

    #[test]
    fn fully_set_sizes_below_100_scale_up() {
        approx(&distribute(&[Some(20.0), Some(30.0)]), &[40.0, 60.0]);
    }

    #[test]
    fn oversized_lists_count_unset_as_fifty_and_scale_down() {
        let out = distribute(&[Some(80.0), Some(60.0), None]);
        approx(
            &out,
            &[80.0 / 190.0 * 100.0, 60.0 / 190.0 * 100.0, 50.0 / 190.0 * 100.0],
        );
        assert!((out.iter().sum::<f64>() - 100.0).abs() < 1e-9);
    }

    #[test]
    fn unset_sizes_next_to_a_full_total_still_get_defined() {
        let out = distribute(&[Some(70.0), Some(30.0), None]);
        assert!((out.iter().sum::<f64>() - 100.0).abs() < 1e-9);
        assert!(out.iter().all(|s| *s > 0.0));
    }

    #[test]
    fn all_zero_sizes_fall_back_to_equal_shares() {
        approx(&distribute(&[Some(0.0), Some(0.0)]), &[50.0, 50.0]);
        assert!(distribute(&[]).is_empty());
    }

    #[test]
    fn distribution_is_idempotent() {
        let first = distribute(&[Some(12.0), None, Some(140.0), None]);
        let again: Vec<Option<f64>> = first.iter().copied().map(Some).collect();
        assert_eq!(distribute(&again), first);
    }

    #[test]
    fn pixel_remainder_goes_to_the_leading_children() {
        let third = 100.0 / 3.0;
        assert_eq!(absolute_sizes(&[third, third, third], 100), vec![34, 33, 33]);
        assert_eq!(absolute_sizes(&[50.0, 50.0], 7), vec![4, 3]);
    }

    #[test]
    fn pixel_sizes_sum_to_the_axis_length() {
        let relative = distribute(&[Some(17.0), Some(29.0), None, Some(3.5), None]);
        for total in [0u16, 1, 9, 99, 101, 640, 1921] {
            let sizes = absolute_sizes(&relative, total);
            let sum: u32 = sizes.iter().map(|s| u32::from(*s)).sum();
            assert_eq!(sum, u32::from(total), "total {total}");
        }
    }

    #[test]
    fn content_extent_subtracts_splitters() {
        assert_eq!(content_extent(100, 3, 5), 90);
        assert_eq!(content_extent(100, 1, 5), 100);
        assert_eq!(content_extent(4, 3, 5), 0);
    }

    #[test]
    fn undersized_children_borrow_from_siblings() {
        let mut relative = vec![5.0, 95.0];
        assert!(respect_min_item_size(&mut relative, 100, &[10, 10]));
        approx(&relative, &[10.0, 90.0]);
    }

    #[test]
    fn rounding_leftover_is_charged_to_the_last_child() {
        let mut relative = vec![8.0, 36.0, 28.0, 28.0];
        assert!(respect_min_item_size(&mut relative, 100, &[10; 4]));
        approx(&relative, &[10.0, 35.0, 27.0, 28.0]);
    }

    #[test]
    fn no_correction_when_slack_cannot_cover_the_deficit() {
        let mut relative = vec![50.0, 50.0];
        assert!(!respect_min_item_size(&mut relative, 15, &[10, 10]));
        approx(&relative, &[50.0, 50.0]);

        let mut single = vec![100.0];
        assert!(!respect_min_item_size(&mut single, 5, &[10]));
    }
}
