// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Write-side mutations.

pub mod bookings;
pub mod operators;
pub mod settings;
pub mod vehicles;
