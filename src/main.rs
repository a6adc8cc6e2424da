use clap::Parser;
use crossbeam::channel::unbounded;
use microtunrs::{
    cli::{ports_for, validate_device, Args, PortDirection},
    config::{config_path, Settings},
    create_scheduler, handle_device_list, logging,
    midi::{self, DefaultMidiEngine},
    presets::PresetLibrary,
    processor::DEFAULT_SAMPLE_RATE,
    state::TuningState,
    ui::{choose_device, format_tuning_table, run_monitor, Console, TuningMonitor},
    AudioMode, EngineMessage, EventLoop, Scheduler, TuningProcessor, TuningTable,
};
use std::error::Error;
use std::io::{self, BufRead};
use std::sync::Arc;

fn main() {
    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn Error>> {
    let args = parse_command_line_arguments();
    let mut settings = match Settings::load(args.config.as_deref()) {
        Ok(settings) => settings,
        Err(e) => {
            initialize_logging(log::LevelFilter::Info);
            return Err(e.into());
        }
    };
    initialize_logging(settings.log_level());
    if let Some(path) = config_path(args.config.as_deref()) {
        log::debug!("Configuration file: {}", path.display());
    }
    settings.apply_args(&args);

    if args.device_list {
        list_available_devices(&handle_device_list());
        return Ok(());
    }

    let presets = PresetLibrary::load(settings.preset_file());
    if args.list_presets {
        list_presets(&presets);
        return Ok(());
    }

    let tuning = Arc::new(TuningTable::new());
    restore_tuning(&settings, &presets, &tuning)?;
    print!("{}", format_tuning_table(&tuning.snapshot()));

    let engine = connect_engine(&settings, args.interactive)?;

    let mut processor = TuningProcessor::new(tuning.clone(), AudioMode::Passthrough);
    processor.prepare(DEFAULT_SAMPLE_RATE, settings.max_block_events);

    let scheduler = create_scheduler();
    let monitor = Arc::new(TuningMonitor::new());
    let (control_tx, control_rx) = unbounded();

    let loop_monitor = monitor.clone();
    let event_loop = scheduler.spawn("retune-loop", move || {
        EventLoop::new(processor, engine, control_rx, loop_monitor).run();
    })?;

    let status = if args.monitor && !args.interactive {
        let monitor = monitor.clone();
        let tuning = tuning.clone();
        Some(scheduler.spawn("monitor", move || run_monitor(monitor, tuning))?)
    } else {
        None
    };

    let session = if args.interactive {
        Console::new(tuning.clone(), presets).run()
    } else {
        wait_for_enter()
    };

    log::info!("Stopping");
    let _ = control_tx.send(EngineMessage::Shutdown);
    monitor.stop();
    if event_loop.join().is_err() {
        log::error!("Event loop thread panicked");
    }
    if let Some(status) = status {
        let _ = status.join();
    }

    save_state(&settings, &tuning);
    session
}

fn initialize_logging(level: log::LevelFilter) {
    if let Err(e) = logging::init_logger(level) {
        eprintln!("Logging disabled: {}", e);
    }
    log::info!("Application starting");
}

fn parse_command_line_arguments() -> Args {
    Args::parse()
}

fn list_available_devices(devices: &[String]) {
    println!("Available MIDI devices:");
    for device in devices {
        println!("  - {}", device);
    }
}

fn list_presets(presets: &PresetLibrary) {
    println!("Available presets:");
    for name in presets.names() {
        println!("  - {}", name);
    }
}

/// Saved state first, then the named preset, then individual offsets from
/// the config file and command line.
fn restore_tuning(
    settings: &Settings,
    presets: &PresetLibrary,
    tuning: &TuningTable,
) -> Result<(), Box<dyn Error>> {
    if let Some(path) = &settings.state_file {
        if path.exists() {
            TuningState::load(path)?.restore(tuning);
        } else {
            log::info!("No tuning state at {} yet", path.display());
        }
    }
    if let Some(name) = &settings.preset {
        presets.apply(name, tuning)?;
    }
    settings.apply_offsets(tuning);
    Ok(())
}

fn save_state(settings: &Settings, tuning: &TuningTable) {
    if let Some(path) = &settings.state_file {
        if let Err(e) = TuningState::capture(tuning).save(path) {
            log::error!("Could not save tuning state: {}", e);
            eprintln!("Could not save tuning state: {}", e);
        }
    }
}

fn connect_engine(
    settings: &Settings,
    interactive: bool,
) -> Result<DefaultMidiEngine, Box<dyn Error>> {
    if let Some(name) = &settings.virtual_port {
        let engine = open_virtual(name)?;
        println!("Opened virtual ports '{}'", name);
        return Ok(engine);
    }

    let devices = handle_device_list();
    let input = resolve_device(
        PortDirection::Input,
        settings.input_device.as_deref(),
        &devices,
        interactive,
    )?;
    let output = resolve_device(
        PortDirection::Output,
        settings.output_device.as_deref(),
        &devices,
        interactive,
    )?;

    let engine = DefaultMidiEngine::connect(&input, &output)?;
    log::info!("Retuning '{}' -> '{}'", input, output);
    println!("Retuning '{}' -> '{}'", input, output);
    Ok(engine)
}

fn resolve_device(
    direction: PortDirection,
    requested: Option<&str>,
    devices: &[String],
    interactive: bool,
) -> Result<String, Box<dyn Error>> {
    let candidates = ports_for(devices, direction);
    match requested {
        Some(name) => Ok(validate_device(name, &candidates)?),
        None if interactive => choose_device(&format!("MIDI {:?}", direction), &candidates)?
            .ok_or_else(|| format!("No MIDI {:?} devices available", direction).into()),
        None => Err(format!(
            "No MIDI {:?} device given; use --input/--output, --virtual-port or --interactive",
            direction
        )
        .into()),
    }
}

#[cfg(unix)]
fn open_virtual(name: &str) -> midi::Result<DefaultMidiEngine> {
    DefaultMidiEngine::create_virtual(name)
}

#[cfg(not(unix))]
fn open_virtual(name: &str) -> midi::Result<DefaultMidiEngine> {
    Err(midi::MidiError::ConnectionError(format!(
        "Virtual port '{}' is not supported on this platform",
        name
    )))
}

fn wait_for_enter() -> Result<(), Box<dyn Error>> {
    log::info!("Application running. Press Enter to exit...");
    println!("\nPress Enter to exit...");
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(())
}
