use std::fs;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use litex_dts::Framebuffer;
use litex_dts::Options;
use log::LevelFilter;

#[macro_use]
mod print;

mod logger;

/// Generates a Linux device tree source from LiteX's csr.json.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The SoC descriptor written by LiteX.
    #[arg(index = 1, value_name = "CSR_JSON")]
    csr_json: PathBuf,
    /// Write the DTS to FILE instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
    /// Physical address of the framebuffer memory (hex with 0x, or decimal).
    #[arg(
        long,
        value_name = "ADDR",
        value_parser = parse_address,
        requires_all = ["framebuffer_width", "framebuffer_height"]
    )]
    framebuffer_base: Option<u64>,
    #[arg(
        long,
        value_name = "PX",
        requires_all = ["framebuffer_base", "framebuffer_height"]
    )]
    framebuffer_width: Option<u32>,
    #[arg(
        long,
        value_name = "PX",
        requires_all = ["framebuffer_base", "framebuffer_width"]
    )]
    framebuffer_height: Option<u32>,
    /// Fold `&label { ... };` blocks into the nodes they amend.
    #[arg(long)]
    inline_patches: bool,
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn framebuffer(&self) -> Result<Option<Framebuffer>> {
        let (Some(base), Some(width), Some(height)) = (
            self.framebuffer_base,
            self.framebuffer_width,
            self.framebuffer_height,
        ) else {
            return Ok(None);
        };

        let framebuffer = Framebuffer::new(base, width, height).with_context(|| {
            format!(
                "invalid framebuffer geometry {}x{} at {:#x}",
                width, height, base
            )
        })?;
        Ok(Some(framebuffer))
    }
}

fn parse_address(s: &str) -> Result<u64, String> {
    let parsed = match s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => s.parse(),
    };

    parsed.map_err(|err| format!("invalid address `{}`: {}", s, err))
}

fn run(args: &Args) -> Result<()> {
    let options = Options {
        framebuffer: args.framebuffer()?,
        inline_patches: args.inline_patches,
    };

    let json = fs::read_to_string(&args.csr_json)
        .with_context(|| format!("failed to read {}", args.csr_json.display()))?;
    let dts = litex_dts::generate_from_json(&json, &options).with_context(|| {
        format!(
            "failed to generate a device tree from {}",
            args.csr_json.display()
        )
    })?;

    match &args.output {
        Some(path) => fs::write(path, &dts)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => std::io::stdout()
            .lock()
            .write_all(dts.as_bytes())
            .context("failed to write to stdout")?,
    }

    Ok(())
}

fn main() {
    let args = Args::parse();
    logger::init(if args.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });

    if let Err(err) = run(&args) {
        error!("{:#}", err);
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use std::ffi::OsStr;

    use clap::CommandFactory;

    use super::*;

    #[test]
    fn verify_args() {
        Args::command().debug_assert();
    }

    #[test]
    fn addresses() {
        assert_eq!(parse_address("0xc8000000"), Ok(0xc800_0000));
        assert_eq!(parse_address("0XF0000000"), Ok(0xf000_0000));
        assert_eq!(parse_address("1073741824"), Ok(0x4000_0000));
        assert!(parse_address("0x").is_err());
        assert!(parse_address("c8000000").is_err());
        assert!(parse_address("-1").is_err());
    }

    #[test]
    fn framebuffer_flags_go_together() {
        assert!(
            Args::try_parse_from(["json2dts", "csr.json", "--framebuffer-base", "0xc8000000"])
                .is_err()
        );

        let args = Args::try_parse_from([
            "json2dts",
            "csr.json",
            "--framebuffer-base",
            "0xc8000000",
            "--framebuffer-width",
            "640",
            "--framebuffer-height",
            "480",
        ])
        .unwrap();
        assert_eq!(
            args.framebuffer().unwrap(),
            Framebuffer::new(0xc800_0000, 640, 480)
        );
    }

    #[test]
    fn no_framebuffer_flags() {
        let args = Args::try_parse_from(["json2dts", "-v", "-o", "out.dts", "csr.json"]).unwrap();
        assert_eq!(args.framebuffer().unwrap(), None);
        assert_eq!(args.output, Some(PathBuf::from("out.dts")));
        assert!(args.verbose);
        assert!(!args.inline_patches);
    }

    #[test]
    fn zero_sized_framebuffer() {
        let args = Args::try_parse_from([
            "json2dts",
            "csr.json",
            "--framebuffer-base",
            "0",
            "--framebuffer-width",
            "0",
            "--framebuffer-height",
            "480",
        ])
        .unwrap();
        assert!(args.framebuffer().is_err());
    }

    #[test]
    fn run_writes_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let csr_json = dir.path().join("csr.json");
        let output = dir.path().join("soc.dts");
        fs::write(
            &csr_json,
            r#"{
                "csr_bases": { "uart": 4026533888 },
                "constants": { "config_clock_frequency": 100000000 },
                "memories": { "main_ram": { "base": 3221225472, "size": 134217728 } }
            }"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            OsStr::new("json2dts"),
            csr_json.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ])
        .unwrap();
        run(&args).unwrap();

        let dts = fs::read_to_string(&output).unwrap();
        assert!(dts.starts_with("/dts-v1/;\n"));
        assert!(dts.contains("liteuart0: serial@f0000800"));
    }

    #[test]
    fn malformed_descriptor_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let csr_json = dir.path().join("csr.json");
        let output = dir.path().join("soc.dts");
        fs::write(&csr_json, r#"{ "csr_bases": { "uart": 4026533888 } }"#).unwrap();

        let args = Args::try_parse_from([
            OsStr::new("json2dts"),
            csr_json.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ])
        .unwrap();
        let err = run(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<litex_dts::Error>(),
            Some(litex_dts::Error::MalformedDescriptor(_))
        ));
        assert!(format!("{:#}", err).contains("malformed descriptor: "));
        assert!(!output.exists());
    }

    #[test]
    fn failed_generation_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let csr_json = dir.path().join("csr.json");
        let output = dir.path().join("soc.dts");
        fs::write(
            &csr_json,
            r#"{
                "csr_bases": { "ethmac": 4026535936, "ethphy": 4026537984 },
                "constants": { "config_clock_frequency": 100000000 },
                "memories": {
                    "main_ram": { "base": 3221225472, "size": 134217728 },
                    "ethmac": { "base": 2952790016, "size": 8192 }
                }
            }"#,
        )
        .unwrap();

        let args = Args::try_parse_from([
            OsStr::new("json2dts"),
            csr_json.as_os_str(),
            OsStr::new("-o"),
            output.as_os_str(),
        ])
        .unwrap();
        let err = run(&args).unwrap_err();
        assert!(format!("{:#}", err).contains("ethmac_tx_slots"));
        assert!(!output.exists());
    }
}
