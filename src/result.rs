// SPDX-License-Identifier: MIT

use crate::error::Error;

/// SWID Result
pub type Result<T> = std::result::Result<T, Error>;
