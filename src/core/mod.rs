//! Core data types for pangenome variation graphs.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Segment`](segment::Segment): A backbone span or grouped variant node
//! - [`Link`](segment::Link): A stranded edge between two segments
//! - [`VariantDescriptor`](segment::VariantDescriptor): The `INF` payload of a variant segment
//! - [`Strand`](types::Strand), [`VariantType`](types::VariantType): Small shared enums
//!
//! ## Segment Ranks
//!
//! | Rank | Meaning | Offset |
//! |------|---------|--------|
//! | 0    | Backbone (linear reference) | 0-based start within the contig |
//! | 1+   | Sample variant | Position of the base preceding the variant |
//!
//! Segment and link types are generic over their identifier so the same
//! structures carry worker-local placeholders during conversion and final
//! `s<N>` ids afterwards.

pub mod segment;
pub mod types;
