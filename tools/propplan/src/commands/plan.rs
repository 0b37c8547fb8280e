use std::{path::PathBuf, str::FromStr};

use anyhow::Result;
use clap::{Args, ValueEnum};
use propcodec::{
    core::Mode,
    transform::{CompileOptions, UnionPolicy},
};

use super::{load_codecs, select};

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
enum ModeArg {
    Serialize,
    Deserialize,
    Both,
}

impl ModeArg {
    fn modes(self) -> &'static [Mode] {
        match self {
            ModeArg::Serialize => &[Mode::Serialize],
            ModeArg::Deserialize => &[Mode::Deserialize],
            ModeArg::Both => &Mode::ALL,
        }
    }
}

#[derive(Args)]
pub struct PlanArgs {
    /// Path to the JSON schema file
    input: PathBuf,

    /// Only show this record
    #[arg(short, long)]
    record: Option<String>,

    /// Which transforms to show
    #[arg(short, long, value_enum, default_value_t = ModeArg::Both)]
    mode: ModeArg,

    /// Policy for general unions: deep-clone | identity-when-all-members-identity
    #[arg(long, value_parser = parse_union_policy)]
    union_policy: Option<UnionPolicy>,
}

impl PlanArgs {
    pub fn run(self) -> Result<()> {
        let options = CompileOptions {
            union_policy: self.union_policy.unwrap_or_default(),
        };
        let codecs = load_codecs(&self.input, options)?;

        for codec in select(&codecs, self.record.as_deref())? {
            println!("{}", codec.name());
            for plan in codec.prop_plans() {
                println!("  {}", plan.prop.name);
                for &mode in self.mode.modes() {
                    println!("    {:<12} {}", format!("{mode}:"), plan.result(mode));
                }
            }
        }
        Ok(())
    }
}

fn parse_union_policy(raw: &str) -> Result<UnionPolicy, String> {
    UnionPolicy::from_str(raw).map_err(|e| e.to_string())
}
