use crate::config::save::{save_detection_points, save_settings};
use crate::config::validate::{check_margins, check_thread_num};
use crate::config::{
    Config, CutMode, DetectionPoints, Language, MAX_THREADS, MIN_THREADS, Margins,
};
use crate::menu::handlers::{run_crop, run_cut, run_cut_with_crop, run_measure};
use anyhow::Result;
use console::{Term, style};
use dialoguer::theme::ColorfulTheme;
use dialoguer::{Input, Select};
use rust_i18n::t;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;

pub fn show_main_menu(
    term: &Term,
    shutdown_signal: &Arc<AtomicBool>,
    config: &mut Config,
) -> Result<bool> {
    term.clear_screen()?;

    println!("{}", style(t!("main_menu.title")).cyan().bold());
    println!("{}", style(t!("main_menu.esc_hint")).dim());

    let options = vec![
        t!("main_menu.opt_cut"),
        t!("main_menu.opt_cut_with_crop"),
        t!("main_menu.opt_measure"),
        t!("main_menu.opt_crop"),
        t!("main_menu.opt_settings"),
        t!("main_menu.exit"),
    ];

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("main_menu.prompt"))
        .items(&options)
        .default(0)
        .interact_on_opt(term)?;

    match selection {
        Some(0) => {
            run_cut(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(1) => {
            run_cut_with_crop(term, shutdown_signal, config)?;
            Ok(true)
        }
        Some(2) => {
            run_measure(term, config)?;
            Ok(true)
        }
        Some(3) => {
            run_crop(term, config)?;
            Ok(true)
        }
        Some(4) => {
            show_settings_menu(term, config)?;
            Ok(true)
        }
        Some(5) => Ok(false),
        None => Ok(false), // ESC pressed - exit
        _ => unreachable!(),
    }
}

/// 設定選單
fn show_settings_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.title")).cyan().bold());
        println!("{}", style(t!("main_menu.esc_hint")).dim());

        let options = vec![
            t!("settings.opt_mode"),
            t!("settings.opt_margins"),
            t!("settings.opt_thread"),
            t!("settings.opt_ignore"),
            t!("settings.opt_detection"),
            t!("settings.opt_language"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.prompt"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => show_mode_menu(term, config)?,
            Some(1) => show_margins_menu(term, config)?,
            Some(2) => show_thread_menu(term, config)?,
            Some(3) => show_ignore_menu(term, config)?,
            Some(4) => show_detection_menu(term, config)?,
            Some(5) => show_language_menu(term, config)?,
            Some(6) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

fn confirm_saved(selected: &str) {
    println!("\n{} {}", style(t!("settings.saved")).green(), selected);
    std::thread::sleep(std::time::Duration::from_secs(1));
}

fn show_mode_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    let items: Vec<String> = CutMode::ALL
        .iter()
        .map(|mode| t!(mode.display_key()).to_string())
        .collect();

    let default_index = CutMode::ALL
        .iter()
        .position(|&mode| mode == config.settings.mode)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.opt_mode"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_mode = CutMode::ALL[selection];
    if selected_mode != config.settings.mode {
        config.settings.mode = selected_mode;
        save_settings(&config.settings)?;
        confirm_saved(&items[selection]);
    }

    Ok(())
}

fn show_margins_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    let current = config.settings.margins;
    let margins = Margins {
        top: prompt_margin(term, t!("settings.prompt_top").as_ref(), current.top)?,
        bottom: prompt_margin(term, t!("settings.prompt_bottom").as_ref(), current.bottom)?,
        left: prompt_margin(term, t!("settings.prompt_left").as_ref(), current.left)?,
        right: prompt_margin(term, t!("settings.prompt_right").as_ref(), current.right)?,
    };
    check_margins(&margins)?;

    if margins != config.settings.margins {
        config.settings.margins = margins;
        save_settings(&config.settings)?;
        confirm_saved("");
    }

    Ok(())
}

fn prompt_margin(term: &Term, prompt: &str, default: u32) -> Result<u32> {
    let value: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact_text_on(term)?;
    Ok(value)
}

fn show_thread_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    let thread_num: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.prompt_thread"))
        .default(config.settings.thread_num)
        .validate_with(|value: &usize| {
            if (MIN_THREADS..=MAX_THREADS).contains(value) {
                Ok(())
            } else {
                Err(t!("errors.thread_num"))
            }
        })
        .interact_text_on(term)?;
    check_thread_num(thread_num)?;

    if thread_num != config.settings.thread_num {
        config.settings.thread_num = thread_num;
        save_settings(&config.settings)?;
        confirm_saved(&thread_num.to_string());
    }

    Ok(())
}

fn show_ignore_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    let ignore_frame_cnt: usize = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.prompt_ignore"))
        .default(config.settings.ignore_frame_cnt)
        .interact_text_on(term)?;

    if ignore_frame_cnt != config.settings.ignore_frame_cnt {
        config.settings.ignore_frame_cnt = ignore_frame_cnt;
        save_settings(&config.settings)?;
        confirm_saved(&ignore_frame_cnt.to_string());
    }

    Ok(())
}

/// 手動偵測點子選單：開關手動模式、輸入 4 + 8 個偵測點
///
/// 啟用前若尚未輸入過偵測點，先走一輪輸入流程再開啟
fn show_detection_menu(term: &Term, config: &mut Config) -> Result<()> {
    loop {
        term.clear_screen()?;

        println!("{}", style(t!("settings.detection_title")).cyan().bold());
        println!("{}", style(t!("main_menu.esc_hint")).dim());

        let toggle_label = if config.settings.manual_detection {
            t!("settings.detection_disable")
        } else {
            t!("settings.detection_enable")
        };
        let options = vec![
            toggle_label,
            t!("settings.detection_edit"),
            t!("settings.back"),
        ];

        let selection = Select::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("settings.opt_detection"))
            .items(&options)
            .default(0)
            .interact_on_opt(term)?;

        match selection {
            Some(0) => {
                if !config.settings.manual_detection && config.detection_points.is_none() {
                    prompt_detection_points(term, config)?;
                }
                config.settings.manual_detection = !config.settings.manual_detection;
                save_settings(&config.settings)?;
                confirm_saved("");
            }
            Some(1) => prompt_detection_points(term, config)?,
            Some(2) | None => break, // ESC or back
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// 依幾何解析時的讀取順序收集偵測點並寫入 detection_points.json
fn prompt_detection_points(term: &Term, config: &mut Config) -> Result<()> {
    let group_1 = [
        prompt_point(term, t!("points.acc_right").as_ref())?,
        prompt_point(term, t!("points.acc_left").as_ref())?,
        prompt_point(term, t!("points.pause_mid").as_ref())?,
        prompt_point(term, t!("points.pause_left").as_ref())?,
    ];
    let group_2 = [
        prompt_point(term, t!("points.center_left").as_ref())?,
        prompt_point(term, t!("points.center_black").as_ref())?,
        prompt_point(term, t!("points.center_mid").as_ref())?,
        prompt_point(term, t!("points.center_right").as_ref())?,
    ];

    let valid_pause_y: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("points.valid_pause_y"))
        .interact_text_on(term)?;
    let mut valid_pause_x = [0u32; 4];
    for (i, x) in valid_pause_x.iter_mut().enumerate() {
        *x = Input::with_theme(&ColorfulTheme::default())
            .with_prompt(t!("points.valid_pause_x", index = i + 1))
            .interact_text_on(term)?;
    }

    let points = DetectionPoints {
        group_1,
        group_2,
        valid_pause_y,
        valid_pause_x,
    };
    save_detection_points(&points)?;
    config.detection_points = Some(points);
    confirm_saved("");

    Ok(())
}

fn prompt_point(term: &Term, name: &str) -> Result<[u32; 2]> {
    let y: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prompts.point_y", name = name))
        .interact_text_on(term)?;
    let x: u32 = Input::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("prompts.point_x", name = name))
        .interact_text_on(term)?;
    Ok([y, x])
}

fn show_language_menu(term: &Term, config: &mut Config) -> Result<()> {
    term.clear_screen()?;

    let items: Vec<&str> = Language::ALL.iter().map(|lang| lang.label()).collect();

    let default_index = Language::ALL
        .iter()
        .position(|&lang| lang == config.settings.language)
        .unwrap_or(0);

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt(t!("settings.opt_language"))
        .items(&items)
        .default(default_index)
        .interact_on_opt(term)?;

    // ESC pressed - return without saving
    let Some(selection) = selection else {
        return Ok(());
    };

    let selected_lang = Language::ALL[selection];
    if selected_lang != config.settings.language {
        config.settings.language = selected_lang;
        rust_i18n::set_locale(selected_lang.locale());
        save_settings(&config.settings)?;
        confirm_saved(selected_lang.label());
    }

    Ok(())
}
