use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::thread;
use std::time::Duration;
use time::OffsetDateTime;
use tracing::{info, warn};

use fpga_link as link;
use fpga_link::FpgaLink;
use toolerator as tlr;

#[derive(Parser, Debug)]
#[command(
    name = "tlr",
    version,
    about = "Toolerator driver tools",
    disable_help_subcommand = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum Backend {
    Mock,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List boards reachable through a link backend
    LinkList {
        #[arg(long, value_enum, default_value_t = Backend::Mock)]
        backend: Backend,
    },
    /// Validate module descriptors and show their config block and buffer sizes
    ModuleValidate {
        /// Single descriptor file
        #[arg(long)]
        file: Option<String>,
        /// Directory of descriptors
        #[arg(long)]
        dir: Option<String>,
        /// Print the parsed descriptors as JSON
        #[arg(long, action = ArgAction::SetTrue)]
        json: bool,
    },
    /// Build the write block for a board
    FrameEncode {
        #[arg(long)]
        file: String,
        /// Instance receiving the command
        #[arg(long, default_value_t = 0)]
        instance: usize,
        /// Requested tool; wrapped onto the turret
        #[arg(long)]
        tool: u32,
        #[arg(long, action = ArgAction::SetTrue)]
        enable: bool,
        #[arg(long, action = ArgAction::SetTrue)]
        tool_change: bool,
    },
    /// Decode a read block and print the status of every instance
    FrameDecode {
        #[arg(long)]
        file: String,
        /// Read block as hex, space-separated (e.g., "00 01 01 08")
        #[arg(long, value_delimiter = ' ')]
        data: Vec<String>,
        /// Tool-change request held by the controller while decoding
        #[arg(long, action = ArgAction::SetTrue)]
        tool_change: bool,
    },
    /// Run driver cycles against a scripted mock board
    Simulate {
        #[arg(long)]
        file: String,
        /// Mock link to run against
        #[arg(long, default_value = "mock0")]
        link: String,
        /// Status codes the board reports, one per cycle, as hex (e.g., "02 03 08")
        #[arg(long, value_delimiter = ' ', default_values_t = vec!["02".to_string(), "06".to_string(), "07".to_string(), "08".to_string()])]
        statuses: Vec<String>,
        /// Requested tool for every instance
        #[arg(long, default_value_t = 1)]
        tool: u32,
        #[arg(long, action = ArgAction::SetTrue)]
        tool_change: bool,
        /// Cycles to run; defaults to one per scripted status
        #[arg(long)]
        cycles: Option<u32>,
        /// Cycle period in milliseconds (0 runs flat out)
        #[arg(long, default_value_t = 0)]
        period_ms: u64,
        /// Protocol version reported by the firmware
        #[arg(long, default_value = "1.0.0")]
        firmware_version: String,
        /// Write status records to a JSONL file
        #[arg(long)]
        to: Option<String>,
        /// Print Prometheus metrics after the run
        #[arg(long, action = ArgAction::SetTrue)]
        metrics: bool,
    },
}

fn main() -> Result<()> {
    setup_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::LinkList { backend } => link_list(backend),
        Commands::ModuleValidate { file, dir, json } => {
            module_validate(file.as_deref(), dir.as_deref(), json)
        }
        Commands::FrameEncode {
            file,
            instance,
            tool,
            enable,
            tool_change,
        } => frame_encode(&file, instance, tool, enable, tool_change),
        Commands::FrameDecode {
            file,
            data,
            tool_change,
        } => frame_decode(&file, &data, tool_change),
        Commands::Simulate {
            file,
            link,
            statuses,
            tool,
            tool_change,
            cycles,
            period_ms,
            firmware_version,
            to,
            metrics,
        } => simulate(
            &file,
            &link,
            &statuses,
            tool,
            tool_change,
            cycles,
            period_ms,
            &firmware_version,
            to.as_deref(),
            metrics,
        ),
    }
}

fn setup_tracing() {
    // Best-effort; avoid panics if already set
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn link_list(backend: Backend) -> Result<()> {
    match backend {
        Backend::Mock => {
            for board in link::MockLink::list()? {
                println!("{}\t{}", board.name, board.driver);
            }
        }
    }
    Ok(())
}

fn module_validate(file: Option<&str>, dir: Option<&str>, json: bool) -> Result<()> {
    match (file, dir) {
        (Some(f), None) => {
            let cfg = tlr::load_module_file(f)?;
            print_module_summary(&cfg)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&cfg)?);
            }
        }
        (None, Some(d)) => {
            let set = tlr::load_modules_dir(d)?;
            let mut boards = tlr::BoardRegistry::new();
            for cfg in set.modules.values() {
                boards.insert(print_module_summary(cfg)?);
            }
            let instances: usize = boards.iter().map(|b| b.len()).sum();
            println!(
                "ok: loaded {} modules, {instances} instances",
                boards.len()
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&set.modules)?);
            }
        }
        _ => {
            return Err(anyhow::anyhow!("provide --file <path> or --dir <dir>"));
        }
    }
    Ok(())
}

fn print_module_summary(cfg: &tlr::ModuleConfig) -> Result<tlr::Toolerator> {
    let block = cfg.config_block()?;
    let board = cfg.build()?;
    let sizes = board.block_sizes();
    println!(
        "ok: {} ({} instances)\tconfig={}\tbuffers: config={} write={} read={}",
        cfg.board.as_deref().unwrap_or("-"),
        board.len(),
        hex(&block),
        sizes.config,
        sizes.write,
        sizes.read
    );
    Ok(board)
}

fn frame_encode(
    file: &str,
    instance: usize,
    tool: u32,
    enable: bool,
    tool_change: bool,
) -> Result<()> {
    let mut board = tlr::load_module_file(file)?.build()?;
    {
        let inst = board.instance_mut(instance)?;
        inst.inputs.enable = enable;
        inst.inputs.tool_change = tool_change;
        inst.inputs.tool_number = tool;
    }
    let mut buf = vec![0u8; board.required_write_buffer()];
    let mut cursor: &mut [u8] = &mut buf;
    board.prepare_write(&mut cursor)?;
    println!("{}", hex(&buf));
    Ok(())
}

fn frame_decode(file: &str, data_hex: &[String], tool_change: bool) -> Result<()> {
    let mut board = tlr::load_module_file(file)?.build()?;
    for inst in board.instances_mut() {
        inst.inputs.tool_change = tool_change;
    }
    let bytes = parse_hex_bytes(data_hex)?;
    let mut cursor: &[u8] = &bytes;
    board.process_read(&mut cursor)?;
    if !cursor.is_empty() {
        warn!(extra = cursor.len(), "trailing bytes after the toolerator read block");
    }
    let recs = board.status_records(None);
    println!("{}", serde_json::to_string_pretty(&recs)?);
    Ok(())
}

#[derive(Serialize)]
struct SimHeader {
    format: String,
    version: u32,
    board: String,
    firmware: String,
    instances: usize,
}

#[allow(clippy::too_many_arguments)]
fn simulate(
    file: &str,
    link_name: &str,
    statuses_hex: &[String],
    tool: u32,
    tool_change: bool,
    cycles: Option<u32>,
    period_ms: u64,
    firmware_version: &str,
    to: Option<&str>,
    metrics: bool,
) -> Result<()> {
    let firmware: tlr::ProtocolVersion = firmware_version.parse()?;
    tlr::check_firmware_version(firmware)?;

    let cfg = tlr::load_module_file(file)?;
    let board_name = cfg.board.clone().unwrap_or_else(|| link_name.to_string());
    let mut board = cfg.build()?;
    for inst in board.instances_mut() {
        inst.inputs.enable = true;
        inst.inputs.tool_change = tool_change;
        inst.inputs.tool_number = tool;
    }

    let statuses = parse_hex_bytes(statuses_hex)?;
    if statuses.is_empty() {
        return Err(anyhow::anyhow!("provide at least one status code"));
    }

    // Every instance reports the same scripted status; homed once past homing
    let mut dev = link::MockLink::open(link_name)?;
    let mut homed = false;
    for &status in &statuses {
        if status >= tlr::ToolchangerStatus::MovingForward.code() {
            homed = true;
        }
        let mut block = Vec::with_capacity(board.required_read_buffer());
        for inst in board.instances() {
            let target = (tool % u32::from(inst.tool_count())) as u8;
            let current = if status == tlr::ToolchangerStatus::Ready.code() {
                target
            } else {
                0
            };
            block.extend_from_slice(
                &tlr::ReadFrame {
                    tool_number: current,
                    homed,
                    status,
                }
                .to_bytes(),
            );
        }
        dev.push_read(block);
    }

    let hub = tlr::MetricsHub::new().map_err(|e| anyhow::anyhow!(e))?;
    hub.observe_board(&board);

    let mut writer = match to {
        Some(path) => {
            let file = File::create(path)?;
            let mut w = BufWriter::new(file);
            let header = SimHeader {
                format: "toolerator-sim".to_string(),
                version: 1,
                board: board_name.clone(),
                firmware: firmware.to_string(),
                instances: board.len(),
            };
            w.write_all(serde_json::to_string(&header)?.as_bytes())?;
            w.write_all(b"\n")?;
            Some(w)
        }
        None => None,
    };

    let total = cycles.unwrap_or(statuses.len() as u32);
    info!(board = %board_name, cycles = total, "simulation started");
    let mut write = vec![0u8; board.required_write_buffer()];
    let mut read = vec![0u8; board.required_read_buffer()];
    for cycle in 0..total {
        {
            let mut cursor: &mut [u8] = &mut write;
            board.prepare_write(&mut cursor)?;
        }
        dev.exchange(&write, &mut read)?;

        let errors_before = board
            .instances()
            .iter()
            .filter(|i| i.outputs.error)
            .count();
        let mut cursor: &[u8] = &read;
        board.process_read(&mut cursor)?;
        hub.observe_cycle(&board, errors_before);

        for rec in board.status_records(Some(OffsetDateTime::now_utc())) {
            println!(
                "cycle={cycle}\tinst={}\ttx={}\tstatus={:#04x}\thoming={}\thomed={}\ttool_changed={}\terror={}\ttool={}",
                rec.index,
                hex(&write),
                rec.status,
                rec.homing,
                rec.homed,
                rec.tool_changed,
                rec.error,
                rec.current_tool
            );
            if let Some(w) = writer.as_mut() {
                w.write_all(serde_json::to_string(&rec)?.as_bytes())?;
                w.write_all(b"\n")?;
            }
        }

        if period_ms > 0 {
            thread::sleep(Duration::from_millis(period_ms));
        }
    }
    if let Some(w) = writer.as_mut() {
        w.flush()?;
    }
    info!(board = %board_name, "simulation finished");

    if metrics {
        print!("{}", hub.encode_text());
    }
    Ok(())
}

fn parse_hex_bytes(items: &[String]) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(items.len());
    for s in items {
        let t = s.trim();
        if t.is_empty() {
            continue;
        }
        let no_prefix = t.strip_prefix("0x").unwrap_or(t);
        let b = u8::from_str_radix(no_prefix, 16)
            .map_err(|e| anyhow::anyhow!("invalid hex byte '{t}': {e}"))?;
        out.push(b);
    }
    Ok(out)
}

fn hex(bytes: &[u8]) -> String {
    let mut s = String::new();
    for b in bytes {
        let _ = core::fmt::Write::write_fmt(&mut s, format_args!("{b:02X} "));
    }
    s.trim_end().to_string()
}
