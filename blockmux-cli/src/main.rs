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

use std::io::{self, Write};

use anyhow::Context;
use blockmux::MultiTrackSorter;
use clap::Parser;
use log::{info, warn};

mod cli_args;
mod output;
mod script;

use cli_args::Opt;
use output::JsonLinesSink;
use script::Script;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let opt = Opt::parse();
    let script = Script::load(&opt.script)?;
    let config = script.sorter_config(opt.lookahead, opt.policy)?;
    info!(
        "Replaying {} frames on {} tracks (lookahead {}, outdated frames: {})",
        script.frame_count(),
        config.track_count,
        config.lookahead,
        config.policy
    );

    let sorter = MultiTrackSorter::new(config)?;
    let (sources, producers) = script.spawn_producers(!opt.no_delay);

    let stdout = io::stdout();
    let mut sink = JsonLinesSink::new(io::BufWriter::new(stdout.lock()));
    let stats = sorter.intercept(sources, &mut sink)?;

    for (track, producer) in producers.into_iter().enumerate() {
        if producer.join().is_err() {
            warn!("Track {} producer panicked", track);
        }
    }
    sink.into_inner().flush().context("Failed to flush stdout")?;

    if opt.stats {
        let report = serde_json::to_string_pretty(&stats)?;
        writeln!(io::stderr(), "{}", report)?;
    }
    Ok(())
}
