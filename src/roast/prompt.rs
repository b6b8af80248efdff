use super::{RoastRequest, StyleVariant};

/// Build the single-turn instruction sent to the language model
pub fn build_prompt(style: StyleVariant, request: &RoastRequest) -> String {
    match style {
        StyleVariant::Global => global_prompt(request),
        StyleVariant::Regional => regional_prompt(request),
    }
}

fn weather_details(request: &RoastRequest) -> String {
    let location = if request.location.trim().is_empty() {
        "Unknown"
    } else {
        request.location.trim()
    };

    format!(
        "Weather details:\n\
         - Weather: {}\n\
         - Temperature: {}°C\n\
         - Feels like: {}°C\n\
         - Humidity: {}%\n\
         - Location: {}",
        request.description, request.temperature, request.feels_like, request.humidity, location
    )
}

fn global_prompt(request: &RoastRequest) -> String {
    format!(
        r#"Generate an absolutely brutal, savage, and unapologetically sarcastic weather roast for a weather app called "Sassy Skies".

{details}

Requirements:
- Keep it under 150 characters but make every word count
- Be ruthlessly sarcastic, brutally honest, and devastatingly witty
- Use profanity liberally if it enhances the roast - "fuck", "shit", "damn", "hell", "ass" are all fair game
- Absolutely destroy the weather situation with zero mercy
- Make it relatable by focusing on how miserable/annoying this weather makes life
- Don't mention the app name
- Be creative, savage, and avoid boring generic responses
- Channel the energy of someone who's genuinely pissed off at the weather

Examples of the brutal tone we want:
- "It's fucking raining. Again. Because apparently the sky has commitment issues."
- "Congratulations! You're living in Satan's sweaty armpit today."
- "Weather so shitty even the weather app is embarrassed to show it."
- "Fog so thick you could cut it with a knife. Too bad you can't see the knife."
- "Wind strong enough to blow away your hopes and dreams."

Generate ONE absolutely savage weather roast that would make people laugh while they suffer:"#,
        details = weather_details(request)
    )
}

fn regional_prompt(request: &RoastRequest) -> String {
    format!(
        r#"Generate a ruthless, savage Indian meme-style weather roast that absolutely destroys the weather condition with desi slang and brutal honesty!

{details}

Requirements:
- Keep it under 150 characters but make it devastatingly brutal
- Be absolutely ruthless and savage while roasting the WEATHER ONLY
- Do NOT insult or roast the user - all insults must target the weather
- Tone: Desi, meme-worthy, laugh-out-loud funny, Hinglish written in Latin script
- Describe how the user is feeling or struggling because of the weather
- Channel the energy of a frustrated Indian who's fed up with the weather
- Only give text, no special characters like (!@#$%^&*)

Examples of the savage Indian weather tone we want:
- "Bc ye kya barish hai, DTC bus se bhi zyada unreliable"
- "Humidity level: Mumbai local ke peak hour se bhi zyada chipchipa"
- "Thand itni hai ki Rajma chawal bhi freezer mein lag raha"
- "Heatwave: Solar panel bhi burnout ho gaya hoga bc"
- "Wind speed: Auto waale ke mood jaisi, kabhi bhi palat jaaye"
- "Saala mausam harami boyfriend jaisa, kabhi sunshine kabhi heartbreak"

Generate ONE absolutely ruthless Indian meme-style weather roast targeting only the weather:"#,
        details = weather_details(request)
    )
}
