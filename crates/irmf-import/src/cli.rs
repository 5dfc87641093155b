use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(
    name = "irmf-import",
    author,
    version,
    about = "Imports an IRMF shader into a renderable project bundle"
)]
pub struct Cli {
    /// IRMF shader link (irmf-editor deep link, github.com blob URL, or
    /// raw.githubusercontent.com URL)
    #[arg(value_name = "LINK")]
    pub link: String,

    /// Destination directory for the generated bundle (created if missing)
    #[arg(value_name = "DIR")]
    pub destination: PathBuf,
}

pub fn parse() -> Cli {
    Cli::parse()
}
