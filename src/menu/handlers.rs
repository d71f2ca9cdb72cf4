use crate::component::margin_measurer;
use crate::component::pause_cutter::PauseCutter;
use crate::config::save::save_settings;
use crate::config::validate::check_file_and_return_path;
use crate::config::{Config, RunConfig};
use crate::pause;
use anyhow::{Result, bail};
use console::{Term, style};
use dialoguer::Input;
use dialoguer::theme::ColorfulTheme;
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

fn report(term: &Term, result: Result<()>) -> Result<()> {
    if let Err(e) = result {
        eprintln!(
            "{} {}",
            style(t!("main_menu.error_prefix")).red().bold(),
            e
        );
    }
    pause(term)?;
    Ok(())
}

fn prompt_seconds(term: &Term) -> Result<(u64, u64)> {
    let start: u64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prompts.start_second"))
        .default(0)
        .interact_text_on(term)?;
    let end: u64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prompts.end_second"))
        .interact_text_on(term)?;
    Ok((start, end))
}

fn prompt_measure_second(term: &Term) -> Result<f64> {
    let second: f64 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prompts.measure_second"))
        .interact_text_on(term)?;
    Ok(second)
}

/// 手動偵測模式需要完整的偵測點才能開跑
fn build_run_config(term: &Term, config: &Config) -> Result<RunConfig> {
    let (start, end) = prompt_seconds(term)?;
    let mut run = RunConfig::from_settings(&config.settings, start, end);
    if config.settings.manual_detection {
        let Some(points) = config.detection_points.clone() else {
            bail!("{}", t!("errors.no_detection_points"));
        };
        run.manual_points = Some(points);
    }
    run.validate()?;
    Ok(run)
}

pub fn run_cut(term: &Term, shutdown_signal: &Arc<AtomicBool>, config: &Config) -> Result<()> {
    let result = (|| {
        let run = build_run_config(term, config)?;
        let working_dir = std::env::current_dir()?;
        PauseCutter::new(run, working_dir, Arc::clone(shutdown_signal)).run()
    })();
    report(term, result)
}

pub fn run_cut_with_crop(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &Config,
) -> Result<()> {
    let result = (|| {
        let measure_second = prompt_measure_second(term)?;
        let mut run = build_run_config(term, config)?;
        let working_dir = std::env::current_dir()?;

        let input = check_file_and_return_path(&working_dir)?;
        // 量一次就好，裁切與剪輯共用同一組黑邊
        let margins = margin_measurer::measure_at(&input, measure_second)?;
        let cropped = margin_measurer::crop(&working_dir, &input, &margins)?;

        run.margins = margins;
        PauseCutter::new(run, working_dir, Arc::clone(shutdown_signal)).run_on(&cropped)
    })();
    report(term, result)
}

pub fn run_measure(term: &Term, config: &mut Config) -> Result<()> {
    let result = (|| {
        let measure_second = prompt_measure_second(term)?;
        let working_dir = std::env::current_dir()?;
        let input = check_file_and_return_path(&working_dir)?;

        let margins = margin_measurer::measure_at(&input, measure_second)?;
        config.settings.margins = margins;
        save_settings(&config.settings)?;
        println!("{}", style(t!("settings.saved")).green());
        Ok(())
    })();
    report(term, result)
}

pub fn run_crop(term: &Term, config: &Config) -> Result<()> {
    let result = (|| {
        let working_dir = std::env::current_dir()?;
        let input = check_file_and_return_path(&working_dir)?;
        margin_measurer::crop(&working_dir, &input, &config.settings.margins)?;
        Ok(())
    })();
    report(term, result)
}
