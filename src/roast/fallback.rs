use super::StyleVariant;

/// Inputs the local rule tables look at
#[derive(Debug, Clone)]
pub struct FallbackInput<'a> {
    pub description: &'a str,
    pub temperature: i32,
    pub humidity: u32,
}

/// Which rule table a roast falls back to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleSet {
    /// Current conditions
    Current,
    /// A forecast day; `precipitation_probability` is 0..=100
    Day { precipitation_probability: u8 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    Rain,
    Snow,
    ClearAndHot,
    Cloud,
    Fog,
    Storm,
    Freezing,
    Scorching,
    Humid,
    Default,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DayRule {
    Rain,
    Snow,
    ClearAndHot,
    Cloud,
    HeatWave,
    Freezing,
    Humid,
    Default,
}

/// Pick the first matching rule. Order matters: "thunderstorm with rain" is rain.
fn classify(input: &FallbackInput<'_>) -> Rule {
    let description = input.description.to_lowercase();
    let has = |needle: &str| description.contains(needle);

    if has("rain") || has("drizzle") {
        Rule::Rain
    } else if has("snow") {
        Rule::Snow
    } else if (has("clear") || has("sunny")) && input.temperature > 25 {
        Rule::ClearAndHot
    } else if has("cloud") {
        Rule::Cloud
    } else if has("fog") || has("mist") || has("haze") {
        Rule::Fog
    } else if has("storm") || has("thunder") {
        Rule::Storm
    } else if input.temperature < 0 {
        Rule::Freezing
    } else if input.temperature > 35 {
        Rule::Scorching
    } else if input.humidity > 80 {
        Rule::Humid
    } else {
        Rule::Default
    }
}

/// Forecast days have no fog or storm rules and milder temperature bounds
fn classify_day(input: &FallbackInput<'_>, precipitation_probability: u8) -> DayRule {
    let description = input.description.to_lowercase();
    let has = |needle: &str| description.contains(needle);

    if has("rain") || precipitation_probability > 60 {
        DayRule::Rain
    } else if has("snow") {
        DayRule::Snow
    } else if has("clear") && input.temperature > 25 {
        DayRule::ClearAndHot
    } else if has("cloud") {
        DayRule::Cloud
    } else if input.temperature > 30 {
        DayRule::HeatWave
    } else if input.temperature < 5 {
        DayRule::Freezing
    } else if input.humidity > 80 {
        DayRule::Humid
    } else {
        DayRule::Default
    }
}

/// Deterministic roast used whenever the language model can't deliver one
pub fn fallback_message(style: StyleVariant, rules: RuleSet, input: &FallbackInput<'_>) -> &'static str {
    match rules {
        RuleSet::Current => {
            let rule = classify(input);
            match style {
                StyleVariant::Global => global_message(rule),
                StyleVariant::Regional => regional_message(rule),
            }
        }
        RuleSet::Day {
            precipitation_probability,
        } => {
            let rule = classify_day(input, precipitation_probability);
            match style {
                StyleVariant::Global => global_day_message(rule),
                StyleVariant::Regional => regional_day_message(rule),
            }
        }
    }
}

fn global_message(rule: Rule) -> &'static str {
    match rule {
        Rule::Rain => "It's fucking raining. Shocking revelation, I know.",
        Rule::Snow => "Snow. Because walking was too easy anyway.",
        Rule::ClearAndHot => "It's hot. Water is wet. News at 11.",
        Rule::Cloud => "Cloudy with a chance of disappointment.",
        Rule::Fog => "Great visibility! Perfect for playing hide and seek with buildings.",
        Rule::Storm => "Storm's coming. Mother Nature's having a tantrum.",
        Rule::Freezing => "It's freezing. Congrats, you live in a freezer.",
        Rule::Scorching => "Satan's armpit is cooler than this.",
        Rule::Humid => "It's so humid, you could swim through the air.",
        Rule::Default => "Weather happened. Congratulations on existing.",
    }
}

fn regional_message(rule: Rule) -> &'static str {
    match rule {
        Rule::Rain => "Barish ho rahi hai bhai. Mumbai local ki tarah packed clouds se.",
        Rule::Snow => "Snow dekh ke Kashmir ka yaad aa gaya. Thand mein bindass chill kar.",
        Rule::ClearAndHot => "Garmi itni hai ki AC bhi ghar jaana chahta hai!",
        Rule::Cloud => "Badal dekh kar lagta hai aaj office se chutti le lein.",
        Rule::Fog => "Yaar itna fog hai, Delhi pollution se competition kar raha hai!",
        Rule::Storm => "Aandhi-toofan aa raha hai! Drama queen weather ka mood off hai.",
        Rule::Freezing => "Itni thand hai ki Rajasthani bhi sweater pehen raha hoga.",
        Rule::Scorching => "Garmi itni hai ki tandoor bhi sharma jaye. AC chalao yaar!",
        Rule::Humid => "Humidity level: Mumbai local train during monsoon.",
        Rule::Default => "Weather ka mood kya hai pata nahi. Jugaad kar ke dekho.",
    }
}

fn global_day_message(rule: DayRule) -> &'static str {
    match rule {
        DayRule::Rain => "Rain incoming. Pack an umbrella or just accept being wet.",
        DayRule::Snow => "Snowpocalypse alert! Time to hibernate.",
        DayRule::ClearAndHot => "Sunny and hot. Sunscreen or become a lobster.",
        DayRule::Cloud => "Cloudy skies ahead. Nature's mood lighting.",
        DayRule::HeatWave => "Heat wave warning. Hell's having a yard sale.",
        DayRule::Freezing => "Freezing temps. Penguins would complain.",
        DayRule::Humid => "Humidity level: Sauna without the relaxation.",
        DayRule::Default => "Weather doing weather things. Revolutionary.",
    }
}

fn regional_day_message(rule: DayRule) -> &'static str {
    match rule {
        DayRule::Rain => "Barish ka plan hai. Umbrella leke nikalna yaar!",
        DayRule::Snow => "Snow dekh kar Kashmir ka mood aa gaya!",
        DayRule::ClearAndHot => "Dhoop mein nikalne ka plan cancel kar do.",
        DayRule::Cloud => "Badal dekh kar chai peene ka mann kar raha hai.",
        DayRule::HeatWave => "Garmi ka tandav! AC full power pe chalao.",
        DayRule::Freezing => "Thand itni hai ki blanket bhi kam pad jaaye.",
        DayRule::Humid => "Humidity level: Mumbai local train wali.",
        DayRule::Default => "Mausam ka kya bharosa hai yaar. Dekh lenge.",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(description: &str, temperature: i32, humidity: u32) -> FallbackInput<'_> {
        FallbackInput {
            description,
            temperature,
            humidity,
        }
    }

    #[test]
    fn test_rule_priority() {
        assert_eq!(classify(&input("light rain", 40, 95)), Rule::Rain);
        assert_eq!(classify(&input("thunderstorm with rain", 20, 50)), Rule::Rain);
        assert_eq!(classify(&input("thunderstorm", 20, 50)), Rule::Storm);
        assert_eq!(classify(&input("light snow", -5, 50)), Rule::Snow);
        assert_eq!(classify(&input("clear sky", 30, 50)), Rule::ClearAndHot);
        assert_eq!(classify(&input("scattered clouds", -3, 90)), Rule::Cloud);
        assert_eq!(classify(&input("mist", 10, 90)), Rule::Fog);
    }

    #[test]
    fn test_numeric_thresholds() {
        // Clear but mild falls through to the numeric rules
        assert_eq!(classify(&input("clear sky", 20, 50)), Rule::Default);
        assert_eq!(classify(&input("clear sky", 25, 50)), Rule::Default);
        assert_eq!(classify(&input("clear sky", -1, 50)), Rule::Freezing);
        assert_eq!(classify(&input("dust", 36, 10)), Rule::Scorching);
        assert_eq!(classify(&input("dust", 35, 81)), Rule::Humid);
        assert_eq!(classify(&input("dust", 35, 80)), Rule::Default);
    }

    #[test]
    fn test_description_match_ignores_case() {
        assert_eq!(classify(&input("Heavy RAIN", 20, 50)), Rule::Rain);
    }

    #[test]
    fn test_day_rule_priority() {
        assert_eq!(classify_day(&input("light rain", 40, 95), 0), DayRule::Rain);
        assert_eq!(classify_day(&input("light snow", -5, 50), 0), DayRule::Snow);
        assert_eq!(classify_day(&input("clear sky", 30, 50), 0), DayRule::ClearAndHot);
        assert_eq!(classify_day(&input("sunny", 31, 50), 0), DayRule::HeatWave);
        assert_eq!(classify_day(&input("scattered clouds", 40, 90), 0), DayRule::Cloud);
    }

    #[test]
    fn test_day_has_no_fog_or_storm_rules() {
        assert_eq!(classify_day(&input("haze", 32, 40), 0), DayRule::HeatWave);
        assert_eq!(classify_day(&input("smoke", 3, 40), 0), DayRule::Freezing);
        assert_eq!(classify_day(&input("thunderstorm", 20, 50), 0), DayRule::Default);
        assert_eq!(classify_day(&input("mist", 20, 85), 0), DayRule::Humid);
    }

    #[test]
    fn test_day_temperature_thresholds() {
        assert_eq!(classify_day(&input("dust", 31, 10), 0), DayRule::HeatWave);
        assert_eq!(classify_day(&input("dust", 30, 10), 0), DayRule::Default);
        assert_eq!(classify_day(&input("dust", 4, 10), 0), DayRule::Freezing);
        assert_eq!(classify_day(&input("dust", 5, 10), 0), DayRule::Default);
    }

    #[test]
    fn test_precipitation_probability_counts_as_rain() {
        let day = input("overcast clouds", 22, 60);
        assert_eq!(classify_day(&day, 61), DayRule::Rain);
        assert_eq!(classify_day(&day, 60), DayRule::Cloud);
    }

    #[test]
    fn test_day_and_current_tables_differ() {
        let case = input("haze", 32, 40);
        assert_eq!(
            fallback_message(StyleVariant::Global, RuleSet::Current, &case),
            "Great visibility! Perfect for playing hide and seek with buildings."
        );
        assert_eq!(
            fallback_message(
                StyleVariant::Global,
                RuleSet::Day { precipitation_probability: 0 },
                &case
            ),
            "Heat wave warning. Hell's having a yard sale."
        );
        assert_eq!(
            fallback_message(
                StyleVariant::Regional,
                RuleSet::Day { precipitation_probability: 0 },
                &input("smoke", 3, 40)
            ),
            "Thand itni hai ki blanket bhi kam pad jaaye."
        );
    }

    #[test]
    fn test_every_style_has_non_empty_message() {
        let cases = [
            input("rain", 10, 10),
            input("snow", 10, 10),
            input("clear", 30, 10),
            input("clouds", 10, 10),
            input("fog", 10, 10),
            input("storm", 10, 10),
            input("", -10, 10),
            input("", 40, 10),
            input("", 20, 90),
            input("", 20, 10),
        ];
        let tables = [RuleSet::Current, RuleSet::Day { precipitation_probability: 0 }];
        for style in [StyleVariant::Global, StyleVariant::Regional] {
            for rules in tables {
                for case in &cases {
                    assert!(!fallback_message(style, rules, case).is_empty());
                }
            }
        }
    }

    #[test]
    fn test_styles_pick_different_tables() {
        let case = input("light rain", 20, 50);
        assert_ne!(
            fallback_message(StyleVariant::Global, RuleSet::Current, &case),
            fallback_message(StyleVariant::Regional, RuleSet::Current, &case)
        );
    }
}
