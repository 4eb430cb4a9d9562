//! JSON API over a single rGFA file.
//!
//! The file is re-read for every request inside a blocking task; no graph is
//! kept between requests.
//!
//! ## Starting the Server
//!
//! ```text
//! # Start on default port 8080
//! pangraph serve graph.gfa
//!
//! # Custom port and auto-open browser
//! pangraph serve graph.gfa --port 3000 --open
//!
//! # Bind to all interfaces
//! pangraph serve graph.gfa --address 0.0.0.0
//! ```
//!
//! ## API Endpoints
//!
//! - `GET /api/summary` - Backbones, samples and counts
//! - `GET /api/subgraph?contig=chr1&from=1&to=5000&samples=S1,S2` - Render data for a region
//! - `GET /api/nodes?ids=s1,s2` - Segments with full sequence

pub mod server;
