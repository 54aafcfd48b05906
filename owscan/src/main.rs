use clap::Parser;
use onewire_search::{OneWireSearch, OneWireSearchKind, RomCode, SearchStatus};
use onewire_sim::SimBus;
use rand::{Rng, SeedableRng, rngs::StdRng};

const BUS_CAPACITY: usize = 64;

/// Enumerate the devices on a simulated 1-Wire bus
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Number of randomly generated devices to attach
    #[arg(short, long, default_value_t = 12, value_parser = clap::value_parser!(u16).range(0..=BUS_CAPACITY as i64))]
    devices: u16,

    /// Seed for the device generator
    #[arg(short, long, default_value_t = 1)]
    seed: u64,

    /// Explicit ROM codes (hex, e.g. 0x3a0000000428), attached instead of random ones
    #[arg(short, long, value_parser = parse_rom)]
    rom: Vec<RomCode>,

    /// Output buffer capacity for each search pass
    #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u16).range(1..))]
    batch: u16,

    /// Search only for devices in alarm state
    #[arg(long)]
    alarm: bool,

    /// Discard addresses whose CRC byte does not check out
    #[arg(long)]
    check_crc: bool,
}

fn parse_rom(arg: &str) -> Result<RomCode, String> {
    let digits = arg.strip_prefix("0x").unwrap_or(arg);
    u64::from_str_radix(digits, 16)
        .map(RomCode::from)
        .map_err(|e| format!("invalid ROM code {arg:?}: {e}"))
}

fn main() {
    // Initialize the logger
    env_logger::init();
    // Parse command line arguments
    let args = Args::parse();
    // Populate the simulated bus
    let mut bus = SimBus::<BUS_CAPACITY>::new();
    if args.rom.is_empty() {
        let mut rng = StdRng::seed_from_u64(args.seed);
        let mut attached: Vec<u64> = Vec::new();
        while attached.len() < args.devices as usize {
            let rom = RomCode::new(rng.random(), rng.random());
            if attached.contains(&rom.to_u64()) {
                continue;
            }
            attached.push(rom.to_u64());
            bus = if rng.random_bool(0.5) {
                bus.with_alarmed_device(rom)
            } else {
                bus.with_device(rom)
            };
        }
    } else {
        for &rom in &args.rom {
            bus = bus.with_device(rom);
        }
    }
    log::info!("Attached {} devices", bus.len());
    // Run the search session to completion, batch by batch
    let kind = if args.alarm {
        OneWireSearchKind::Alarmed
    } else {
        OneWireSearchKind::Normal
    };
    let mut search = OneWireSearch::new(kind).with_crc_check(args.check_crc);
    let mut codes = vec![RomCode::ZERO; args.batch as usize];
    let mut total = 0;
    while search.status() == SearchStatus::More {
        let count = search
            .run(&mut bus, &mut codes)
            .expect("simulated bus cannot fail");
        total += count;
        log::info!("Found {} addresses, status {:?}", count, search.status());
        for code in &codes[..count] {
            println!("{code}");
        }
    }
    log::info!(
        "{} addresses in {} transactions, final status {:?}",
        total,
        bus.resets(),
        search.status()
    );
    if search.status() == SearchStatus::Failed {
        std::process::exit(1);
    }
}
