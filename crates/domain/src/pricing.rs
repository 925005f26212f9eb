// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Advance payment calculation.

/// Smallest advance the operator accepts, in rupees.
pub const MIN_ADVANCE_AMOUNT: i64 = 500;

/// Computes the advance owed on a booking.
///
/// The advance is a quarter of the total, rounded half up to the nearest
/// rupee, and never less than [`MIN_ADVANCE_AMOUNT`].
///
/// Amounts are whole rupees. `total_amount` is expected to be positive;
/// non-positive totals still produce the minimum advance.
#[must_use]
pub fn advance_amount(total_amount: i64) -> i64 {
    // (x + 2) / 4 is round(x / 4) with halves rounded up, for x >= 0
    let quarter: i64 = total_amount.max(0).saturating_add(2) / 4;
    quarter.max(MIN_ADVANCE_AMOUNT)
}
