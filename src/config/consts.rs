// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

/// File extension used for vector outputs when none is requested
pub const DEFAULT_VECTOR_FORMAT: &str = "gpkg";
/// File extension used for raster outputs when none is requested
pub const DEFAULT_RASTER_FORMAT: &str = "tif";
/// Ellipsoid used for distance and area calculations (WGS 84)
pub const DEFAULT_ELLIPSOID: &str = "EPSG:7030";
/// Tracing filter used when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "processing_model=info";
/// Tracing target for user facing feedback messages
pub const FEEDBACK_LOG_TARGET: &str = "processing";
