use clap::Parser;
use dep_albc::BypassCode;

/// Work with Apple Activation Lock Bypass Codes: generate a random one,
/// or convert between the raw and "human readable" forms.
#[derive(Parser)]
#[command(version, about)]
struct Args {
    /// Hex-encoded raw bypass code
    #[arg(long)]
    raw: Option<String>,

    /// Dash-separated "human readable" bypass code
    #[arg(long, conflicts_with = "raw")]
    code: Option<String>,
}

fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;
    let args = Args::parse();

    let bc = match (args.raw, args.code) {
        (Some(raw), None) => BypassCode::from_bytes(&hex::decode(raw)?)?,
        (None, Some(code)) => BypassCode::from_code(&code)?,
        _ => BypassCode::new(),
    };

    println!("{}  raw", hex::encode(bc.as_bytes()));
    println!("{}  code", bc.code());
    println!("{}  hash", bc.hash());

    Ok(())
}
