// SPDX-License-Identifier: Apache-2.0

//! Build-time validation of the integer width features.

// Exactly one of `int32` and `int64` selects `Integer`.
#[cfg(not(any(feature = "int32", feature = "int64")))]
compile_error!("No integer width feature selected: enable one of 'int32' or 'int64'");

#[cfg(all(feature = "int32", feature = "int64"))]
compile_error!(
    "Features 'int32' and 'int64' are mutually exclusive: use default-features = false with 'int32'"
);
