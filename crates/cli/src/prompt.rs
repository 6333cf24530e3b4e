use inquire::*;

use pahelink::errors::*;
use pahelink_core::{AudioLanguage, EpisodeRange, QualityTarget};

use crate::args::*;

const QUALITY_CHOICES: [&str; 7] = ["highest", "1080p", "720p", "480p", "360p", "lowest", "custom"];
const LANG_CHOICES: [&str; 4] = ["jp", "en", "zh", "other"];

/// position of `current` among `choices`; unknown values land on the last,
/// free-form entry.
fn starting_cursor(choices: &[&str], current: &str) -> usize {
    choices
        .iter()
        .position(|choice| *choice == current)
        .unwrap_or(choices.len().saturating_sub(1))
}

fn prompt_err(what: &str) -> impl FnOnce(InquireError) -> PaheError + '_ {
    move |err| PaheError::Message(format!("failed to read {what}: {err}"))
}

pub fn prompt_for_args(args: ResolveArgs) -> Result<RuntimeArgs> {
    let series = Text::new("series:")
        .with_help_message("anime url, play url or anime uuid")
        .with_initial_value(args.series.as_deref().unwrap_or_default())
        .prompt()
        .map_err(prompt_err("series"))?;

    let cookies = Text::new("cookies:")
        .with_help_message("leave empty to skip; also read from PAHELINK_COOKIES")
        .with_initial_value(args.cookies.as_deref().unwrap_or_default())
        .prompt()
        .map_err(prompt_err("cookies"))?;
    let cookies = Some(cookies).filter(|c| !c.trim().is_empty());

    let episodes = Text::new("episodes:")
        .with_help_message("all, a number (e.g. 12) or a range (e.g. 1-12)")
        .with_initial_value(&args.episodes.to_string())
        .prompt()
        .map_err(prompt_err("episodes"))?
        .parse::<EpisodeRange>()?;

    let quality_cursor = starting_cursor(&QUALITY_CHOICES, &args.quality.to_string());
    let quality_choice = Select::new("preferred quality:", QUALITY_CHOICES.to_vec())
        .with_starting_cursor(quality_cursor)
        .prompt()
        .map_err(prompt_err("quality"))?;

    let quality = if quality_choice == "custom" {
        Text::new("custom quality:")
            .with_initial_value(&args.quality.to_string())
            .with_help_message("(e.g. 900p, highest)")
            .prompt()
            .map_err(prompt_err("custom quality"))?
            .parse::<QualityTarget>()?
    } else {
        quality_choice.parse::<QualityTarget>()?
    };

    let lang_cursor = starting_cursor(&LANG_CHOICES, args.lang.code());
    let lang_choice = Select::new("preferred audio language:", LANG_CHOICES.to_vec())
        .with_help_message("falls back to any language when none match")
        .with_starting_cursor(lang_cursor)
        .prompt()
        .map_err(prompt_err("language"))?;

    let lang_code = if lang_choice == "other" {
        let initial = match &args.lang {
            AudioLanguage::Other(raw) => raw.as_str(),
            _ => "",
        };
        Text::new("language tag:")
            .with_initial_value(initial)
            .with_help_message("raw tag as shown on the mirror badge (e.g. ger)")
            .prompt()
            .map_err(prompt_err("language tag"))?
    } else {
        lang_choice.to_string()
    };
    let lang = lang_code.parse::<AudioLanguage>().unwrap_or_default();

    Ok(RuntimeArgs::new(series, cookies, episodes, quality, lang))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_starts_at_passed_quality() {
        let at = |target: QualityTarget| starting_cursor(&QUALITY_CHOICES, &target.to_string());

        assert_eq!(QUALITY_CHOICES[at(QualityTarget::Highest)], "highest");
        assert_eq!(QUALITY_CHOICES[at(QualityTarget::Lowest)], "lowest");
        assert_eq!(QUALITY_CHOICES[at(QualityTarget::Exact(720))], "720p");
        assert_eq!(QUALITY_CHOICES[at(QualityTarget::Exact(900))], "custom");
    }

    #[test]
    fn cursor_starts_at_passed_language() {
        let at = |lang: AudioLanguage| starting_cursor(&LANG_CHOICES, lang.code());

        assert_eq!(LANG_CHOICES[at(AudioLanguage::English)], "en");
        assert_eq!(LANG_CHOICES[at(AudioLanguage::Chinese)], "zh");
        assert_eq!(LANG_CHOICES[at(AudioLanguage::Other("ger".into()))], "other");
    }
}
