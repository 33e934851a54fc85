/*
 * Copyright 2025 Security Union LLC
 *
 * Licensed under either of
 *
 * * Apache License, Version 2.0
 *   (http://www.apache.org/licenses/LICENSE-2.0)
 * * MIT license
 *   (http://opensource.org/licenses/MIT)
 *
 * at your option.
 *
 * Unless you explicitly state otherwise, any contribution intentionally
 * submitted for inclusion in the work by you, as defined in the Apache-2.0
 * license, shall be dual licensed as above, without any additional terms or
 * conditions.
 */

use std::path::PathBuf;

use blockmux::OutdatedPolicy;
use clap::Parser;

/// Block Mux CLI
///
/// Replays a JSON track script through the multi-track sorter and prints the
/// interleaved blocks as JSON lines on stdout.
#[derive(Parser, Debug)]
#[clap(name = "blockmux", version)]
pub struct Opt {
    /// Path to the track script.
    pub script: PathBuf,

    /// Override the lookahead window from the script.
    #[clap(long = "lookahead", short = 'l')]
    pub lookahead: Option<usize>,

    /// Override the outdated frame policy from the script.
    ///
    /// Accepts "drop", "write", "drop-outdated" or "write-outdated".
    #[clap(long = "policy", short = 'p')]
    pub policy: Option<OutdatedPolicy>,

    /// Print session statistics as JSON on stderr once the sorter is done.
    #[clap(long = "stats")]
    pub stats: bool,

    /// Ignore the per-frame `at_ms` offsets and feed every track as fast as possible.
    #[clap(long = "no-delay")]
    pub no_delay: bool,
}
