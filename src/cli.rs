use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scrape the forum for a keyword and score every post and comment
    Scrape {
        /// Keyword to search for (case-sensitive)
        keyword: String,

        /// Leave the neutral bucket out of the counts chart
        #[clap(long, default_value = "false")]
        exclude_neutral: bool,

        /// Also store the scored posts in the vector index
        #[clap(long, default_value = "false")]
        index: bool,
    },
    /// Find indexed posts similar to a query
    Search {
        query: String,

        /// Number of posts to return (1-500). Defaults to semantic.default_top_k
        #[clap(short = 'k', long)]
        top_k: Option<usize>,
    },
    /// Show vector index statistics
    Stats {},
    /// Create the vector index if it does not exist
    InitIndex {},
    /// Serve the JSON API
    Daemon {
        /// Address to listen on. Defaults to daemon.bind
        #[clap(long)]
        bind: Option<String>,
    },
}
