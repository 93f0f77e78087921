use crate::params::{parse_commit, ParamEdit};
use crate::{GalaxyParameters, Rgb};
use clap::Args;

/// Galaxy shape and color options shared by the viewer and headless mode
#[derive(Args, Debug, Clone)]
pub struct GalaxyArgs {
  /// Number of particles
  #[arg(long, default_value_t = 10_000)]
  pub count: u32,
  /// Point render size
  #[arg(long, default_value_t = 0.02)]
  pub size: f32,
  /// Maximum galaxy radius
  #[arg(long, default_value_t = 5.0)]
  pub radius: f32,
  /// Number of spiral arms
  #[arg(long, default_value_t = 2)]
  pub branches: u32,
  /// Radians of twist per unit radius
  #[arg(long, default_value_t = 1.0, allow_negative_numbers = true)]
  pub spin: f32,
  /// Jitter magnitude scale
  #[arg(long, default_value_t = 0.2)]
  pub randomness: f32,
  /// Jitter concentration exponent
  #[arg(long, default_value_t = 3.0)]
  pub randomness_power: f32,
  /// Color at the galaxy center
  #[arg(long, default_value = "#ff6030", value_parser = parse_color)]
  pub inside_color: Rgb,
  /// Color at the galaxy rim
  #[arg(long, default_value = "#1b3984", value_parser = parse_color)]
  pub outside_color: Rgb,
  /// Seed for reproducible galaxies (random when omitted)
  #[arg(long)]
  pub seed: Option<u64>,
}

impl GalaxyArgs {
  pub fn parameters(&self) -> GalaxyParameters {
    GalaxyParameters {
      count: self.count,
      size: self.size,
      radius: self.radius,
      branches: self.branches,
      spin: self.spin,
      randomness: self.randomness,
      randomness_power: self.randomness_power,
      inside_color: self.inside_color,
      outside_color: self.outside_color,
    }
  }
}

/// Everything the viewer needs to start
#[derive(Debug, Clone)]
pub struct RunConfig {
  pub params: GalaxyParameters,
  pub seed: Option<u64>,
  pub headless: bool,
  /// Edits replayed in order after the first galaxy, headless only
  pub commits: Vec<ParamEdit>,
}

pub fn parse_color(s: &str) -> Result<Rgb, String> {
  s.parse().map_err(|err: crate::GalaxyError| err.to_string())
}

pub fn parse_commit_arg(s: &str) -> Result<ParamEdit, String> {
  parse_commit(s).map_err(|err| err.to_string())
}

#[cfg(test)]
mod tests {
  use super::*;
  use clap::Parser;

  #[derive(Parser)]
  struct Cli {
    #[command(flatten)]
    galaxy: GalaxyArgs,
  }

  #[test]
  fn defaults_match_the_default_galaxy() {
    let cli = Cli::try_parse_from(["galaxy"]).unwrap();
    assert_eq!(cli.galaxy.parameters(), GalaxyParameters::default());
    assert_eq!(cli.galaxy.seed, None);
  }

  #[test]
  fn parses_every_option() {
    let cli = Cli::try_parse_from([
      "galaxy",
      "--count",
      "500",
      "--branches",
      "4",
      "--spin",
      "-2.5",
      "--randomness-power",
      "1.5",
      "--inside-color",
      "#ffffff",
      "--seed",
      "9",
    ])
    .unwrap();
    let params = cli.galaxy.parameters();
    assert_eq!(params.count, 500);
    assert_eq!(params.branches, 4);
    assert_eq!(params.spin, -2.5);
    assert_eq!(params.randomness_power, 1.5);
    assert_eq!(params.inside_color, Rgb::new(1.0, 1.0, 1.0));
    assert_eq!(cli.galaxy.seed, Some(9));
  }

  #[test]
  fn rejects_bad_colors() {
    assert!(Cli::try_parse_from(["galaxy", "--outside-color", "blue"]).is_err());
  }
}
