//! Interactive console for editing the tuning while the event loop runs.

use crate::note::PitchClass;
use crate::presets::PresetLibrary;
use crate::tuning::{TuningSnapshot, TuningTable, MAX_OFFSET_CENTS, MIN_OFFSET_CENTS};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use log::{info, warn};
use std::error::Error;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    SetOffset,
    LoadPreset,
    SavePreset,
    Reset,
    ShowTuning,
    Quit,
}

impl MenuAction {
    pub const ALL: [MenuAction; 6] = [
        MenuAction::SetOffset,
        MenuAction::LoadPreset,
        MenuAction::SavePreset,
        MenuAction::Reset,
        MenuAction::ShowTuning,
        MenuAction::Quit,
    ];

    pub fn label(self) -> &'static str {
        match self {
            MenuAction::SetOffset => "Set offset",
            MenuAction::LoadPreset => "Load preset",
            MenuAction::SavePreset => "Save preset",
            MenuAction::Reset => "Reset to equal temperament",
            MenuAction::ShowTuning => "Show tuning",
            MenuAction::Quit => "Quit",
        }
    }
}

/// One line per pitch class, e.g. `E    -13.69`.
pub fn format_tuning_table(snapshot: &TuningSnapshot) -> String {
    let mut out = String::new();
    for (pitch_class, cents) in snapshot.iter() {
        out.push_str(&format!("{:<4} {:+7.2}\n", pitch_class.name(), cents));
    }
    out
}

/// Parse a cents value typed by the user, rejecting anything out of range.
pub fn parse_cents(text: &str) -> Result<f32, String> {
    let cents: f32 = text
        .trim()
        .trim_start_matches('+')
        .parse()
        .map_err(|_| format!("'{}' is not a number", text.trim()))?;
    if !(MIN_OFFSET_CENTS..=MAX_OFFSET_CENTS).contains(&cents) {
        return Err(format!(
            "Offset must be between {} and {} cents",
            MIN_OFFSET_CENTS, MAX_OFFSET_CENTS
        ));
    }
    Ok(cents)
}

/// Pick one of `devices`, or `None` when the list is empty.
pub fn choose_device(prompt: &str, devices: &[String]) -> Result<Option<String>, Box<dyn Error>> {
    if devices.is_empty() {
        return Ok(None);
    }
    let index = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .items(devices)
        .default(0)
        .interact()?;
    Ok(devices.get(index).cloned())
}

pub struct Console {
    tuning: Arc<TuningTable>,
    presets: PresetLibrary,
    theme: ColorfulTheme,
}

impl Console {
    pub fn new(tuning: Arc<TuningTable>, presets: PresetLibrary) -> Self {
        Self {
            tuning,
            presets,
            theme: ColorfulTheme::default(),
        }
    }

    /// Runs the menu until the user picks Quit.
    pub fn run(&mut self) -> Result<(), Box<dyn Error>> {
        loop {
            let labels: Vec<&str> = MenuAction::ALL.iter().map(|a| a.label()).collect();
            let choice = Select::with_theme(&self.theme)
                .with_prompt("microtunrs")
                .items(&labels)
                .default(0)
                .interact()?;

            match MenuAction::ALL[choice] {
                MenuAction::SetOffset => self.set_offset()?,
                MenuAction::LoadPreset => self.load_preset()?,
                MenuAction::SavePreset => self.save_preset()?,
                MenuAction::Reset => {
                    self.tuning.reset();
                    println!("All offsets reset to 0 cents");
                }
                MenuAction::ShowTuning => {
                    print!("{}", format_tuning_table(&self.tuning.snapshot()));
                }
                MenuAction::Quit => {
                    info!("Console closed");
                    return Ok(());
                }
            }
        }
    }

    fn set_offset(&mut self) -> Result<(), Box<dyn Error>> {
        let items: Vec<String> = PitchClass::ALL
            .iter()
            .map(|pc| format!("{:<3} ({:+.2})", pc.name(), self.tuning.offset(*pc)))
            .collect();
        let index = Select::with_theme(&self.theme)
            .with_prompt("Pitch class")
            .items(&items)
            .default(0)
            .interact()?;
        let pitch_class = PitchClass::ALL[index];

        let text: String = Input::with_theme(&self.theme)
            .with_prompt(format!("Offset for {} in cents", pitch_class))
            .with_initial_text(format!("{}", self.tuning.offset(pitch_class)))
            .validate_with(|input: &String| parse_cents(input).map(|_| ()))
            .interact_text()?;

        let cents = parse_cents(&text)?;
        self.tuning.set_offset(pitch_class, cents);
        Ok(())
    }

    fn load_preset(&mut self) -> Result<(), Box<dyn Error>> {
        if self.presets.is_empty() {
            println!("No presets available");
            return Ok(());
        }
        let names = self.presets.names();
        let index = Select::with_theme(&self.theme)
            .with_prompt("Preset")
            .items(&names)
            .default(0)
            .interact()?;
        let name = &names[index];
        self.presets.apply(name, &self.tuning)?;
        println!("Applied '{}'", name);
        Ok(())
    }

    fn save_preset(&mut self) -> Result<(), Box<dyn Error>> {
        let name: String = Input::with_theme(&self.theme)
            .with_prompt("Preset name")
            .interact_text()?;
        let name = name.trim();
        if name.is_empty() {
            return Ok(());
        }
        self.presets.capture(name, &self.tuning);

        match self.presets.save() {
            Ok(true) => println!("Saved '{}'", name),
            Ok(false) => println!("No preset file configured; '{}' kept for this session", name),
            Err(e) => {
                warn!("Could not save presets: {}", e);
                println!("Could not save presets: {}", e);
            }
        }
        Ok(())
    }
}
