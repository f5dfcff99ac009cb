//! Clean raw material codes into canonical form.

use clap::Args;

use rebar_core::clean_material_code;

/// Arguments for the clean command.
#[derive(Args)]
pub struct CleanArgs {
    /// Raw material codes, e.g. "5 rfi 12/8,L=3,5m"
    #[arg(required = true)]
    codes: Vec<String>,
}

pub async fn run(args: CleanArgs) -> anyhow::Result<()> {
    let mut invalid = 0;

    for raw in &args.codes {
        match clean_material_code(raw) {
            Some(code) => println!("{}", code),
            None => {
                println!("invalid");
                invalid += 1;
            }
        }
    }

    if invalid > 0 {
        anyhow::bail!("{} of {} codes are invalid", invalid, args.codes.len());
    }
    Ok(())
}
