//! Splitting a work range into work-groups.

use super::LaunchGeometry;

/// Split `total_work_items` into work-groups of at most `max_group_size`.
///
/// When the range does not divide evenly, a split into smaller groups that
/// are all the same size is preferred, as long as it does not need more
/// groups than `max_group_size` (which would force a second level of
/// splitting). Otherwise the last group is a short one.
///
/// Both arguments must be non-zero.
pub fn compute_group_size(total_work_items: usize, max_group_size: usize) -> LaunchGeometry {
    debug_assert!(total_work_items > 0, "total_work_items must be > 0");
    debug_assert!(max_group_size > 0, "max_group_size must be > 0");

    if total_work_items <= max_group_size {
        return LaunchGeometry::new(total_work_items, 1);
    }

    let count = total_work_items / max_group_size;
    let rem = total_work_items % max_group_size;
    if rem == 0 {
        return LaunchGeometry::new(max_group_size, count);
    }

    // 160 items with max 128: five groups of 32 beat 128 + 32.
    let alt_count = total_work_items / rem;
    let alt_rem = total_work_items % rem;
    if alt_rem == 0 && alt_count <= max_group_size {
        tracing::trace!(
            total_work_items,
            max_group_size,
            group_size = rem,
            group_count = alt_count,
            "using uniform split"
        );
        return LaunchGeometry::new(rem, alt_count);
    }

    LaunchGeometry::new(max_group_size, count + 1)
}
