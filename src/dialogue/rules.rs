use super::{Language, Pattern, Rule};
use regex::Regex;

use Language::{English, Kannada};

pub const FALLBACK_RESPONSE: &str = "Sorry, I don't have that information. Try asking about parking, food court, offers, restrooms, cinema, or events!";

const GREETING_PATTERN: &str = r"(^|\b)(hi|hello|hey|good morning|good evening)\b";

/// Mall assistant rules in priority order: the Kannada group first, then
/// the English group.
pub fn default_rules() -> Vec<Rule> {
    let mut rules = kannada_rules();
    rules.extend(english_rules());
    rules
}

fn kannada_rules() -> Vec<Rule> {
    vec![
        Rule::contains(
            "kn.greeting",
            Kannada,
            &["ಹಾಯ್", "ನಮಸ್ಕಾರ", "ಹಲೋ"],
            "🙏 ನಮಸ್ಕಾರ! ಸ್ಮಾರ್ಟ್ ಮಾಲ್‌ಗೆ ಸ್ವಾಗತ. ನಾನು ನಿಮಗೆ ಹೇಗೆ ಸಹಾಯ ಮಾಡಲಿ?",
        ),
        Rule::contains("kn.thanks", Kannada, &["ಧನ್ಯವಾದ"], "😊 ಧನ್ಯವಾದಗಳು! ಶುಭ ದಿನವಾಗಲಿ."),
        Rule::contains(
            "kn.timing",
            Kannada,
            &["ಸಮಯ", "ತೆರೆದಿದೆ"],
            "🕙 ಮಾಲ್ ಸಮಯ: ಬೆಳಿಗ್ಗೆ 10 ರಿಂದ ರಾತ್ರಿ 10 ರವರೆಗೆ.",
        ),
        Rule::contains(
            "kn.parking",
            Kannada,
            &["ಪಾರ್ಕಿಂಗ್"],
            "🚗 ಪಾರ್ಕಿಂಗ್ ಸೌಲಭ್ಯ ಬೆಸ್ಮೆಂಟ್‌ನಲ್ಲಿ ಲಭ್ಯವಿದೆ. ಗೇಟ್ 2ರಿಂದ ಪ್ರವೇಶ.",
        ),
        Rule::contains(
            "kn.food",
            Kannada,
            &["ಆಹಾರ", "ಫುಡ್ ಕೋರ್ಟ್"],
            "🍽️ ಫುಡ್ ಕೋರ್ಟ್ ಲೆವಲ್ 2ರಲ್ಲಿ ಇದೆ.",
        ),
        Rule::contains(
            "kn.restroom",
            Kannada,
            &["ಶೌಚಾಲಯ", "ಟಾಯ್ಲೆಟ್"],
            "🚻 ಶೌಚಾಲಯಗಳು ಎಲ್ಲಾ ಮಹಡಿಗಳಲ್ಲೂ ಲಿಫ್ಟ್ ಹತ್ತಿರ ಲಭ್ಯವಿವೆ.",
        ),
        Rule::contains(
            "kn.lift",
            Kannada,
            &["ಲಿಫ್ಟ್", "ಎಲಿವೇಟರ್"],
            "⬆️⬇️ ಲಿಫ್ಟ್‌ಗಳು ಪ್ರತಿಯೊಂದು ಮಹಡಿಯ ಮಧ್ಯಭಾಗದಲ್ಲಿ ಇವೆ.",
        ),
        Rule::contains(
            "kn.exit",
            Kannada,
            &["ನಿರ್ಗಮನ", "ಬಿಟ್ಟು ಹೋಗುವ"],
            "🚪 ಮುಖ್ಯ ನಿರ್ಗಮನ ದ್ವಾರ ಗ್ರೌಂಡ್ ಫ್ಲೋರ್‌ನಲ್ಲಿ ಇದೆ.",
        ),
    ]
}

fn english_rules() -> Vec<Rule> {
    vec![
        // Greetings
        Rule {
            name: "en.greeting",
            language: English,
            pattern: Pattern::Regex(Regex::new(GREETING_PATTERN).expect("greeting pattern is valid")),
            response: "👋 Hello! Welcome to the Smart Mall. How can I help you today?",
        },
        Rule::contains("en.thanks", English, &["thank"], "😊 You’re welcome! Enjoy your visit."),
        // Facilities
        Rule::contains(
            "en.atm",
            English,
            &["atm", "cash"],
            "There are ATMs near the main entrance beside the information desk.",
        ),
        Rule::contains(
            "en.elevator",
            English,
            &["elevator", "lift"],
            "Elevators are located at the center of every floor.",
        ),
        Rule::contains(
            "en.escalator",
            English,
            &["escalator"],
            "Escalators are available on the east and west ends of each floor.",
        ),
        Rule::contains(
            "en.exit",
            English,
            &["exit"],
            "The main exit is on the ground floor near the reception area.",
        ),
        Rule::contains(
            "en.entrance",
            English,
            &["entrance"],
            "There are two entrances: North Gate and South Gate.",
        ),
        Rule::contains(
            "en.stairs",
            English,
            &["stairs", "step"],
            "Stairs are next to the elevators on all floors.",
        ),
        Rule::contains(
            "en.kids_zone",
            English,
            &["kids zone", "play area"],
            "Kids Zone is on Level 3 beside the cinema hall.",
        ),
        Rule::contains(
            "en.game_zone",
            English,
            &["gaming", "game zone"],
            "Game Zone is located beside the food court on Level 2.",
        ),
        Rule::contains(
            "en.cinema",
            English,
            &["cinema", "movie"],
            "The cinema hall is on Level 3. You can buy tickets at the counter or online.",
        ),
        // Mall information
        Rule::contains(
            "en.timing",
            English,
            &["timing", "hours", "open"],
            "Mall timings are 10:00 AM to 10:00 PM.",
        ),
        Rule::contains(
            "en.wifi",
            English,
            &["wifi", "internet"],
            "Yes, Free WiFi is available. Connect to 'MallFreeWiFi' and enter your phone number.",
        ),
        Rule::contains(
            "en.security",
            English,
            &["security", "lost", "help desk"],
            "Security help desk is near Gate 1. You can report any help needed there.",
        ),
        Rule::contains(
            "en.first_aid",
            English,
            &["first aid", "medical", "doctor"],
            "First Aid Room is located beside the information counter on Ground Floor.",
        ),
        // Shops
        Rule::contains(
            "en.fashion",
            English,
            &["clothes", "fashion"],
            "Fashion stores are mostly on Level 1. You can find Zudio, H&M, Lifestyle and more.",
        ),
        Rule::contains(
            "en.electronics",
            English,
            &["electronics", "mobile", "laptop"],
            "Electronic stores like Croma and Reliance Digital are on Level 1.",
        ),
        Rule::contains(
            "en.grocery",
            English,
            &["grocery", "supermarket"],
            "The supermarket is on the basement floor near the parking area.",
        ),
        Rule::contains(
            "en.jewellery",
            English,
            &["jewellery", "gold"],
            "Jewelry stores like Tanishq and Kalyan Jewelers are on Level 1.",
        ),
        // Offers & events
        Rule::contains(
            "en.offers",
            English,
            &["offer", "discount", "sale"],
            "Today's offers: 10% off at Fashion Hub, Buy 1 Get 1 at Sweet Treats.",
        ),
        Rule::contains(
            "en.events",
            English,
            &["event", "show", "live"],
            "There is a live musical event today at 6 PM near the central atrium.",
        ),
        // Food
        Rule::contains(
            "en.food_court",
            English,
            &["food court"],
            "The food court is on Level 2 near the south entrance.",
        ),
        Rule::contains(
            "en.pizza",
            English,
            &["pizza"],
            "You can get pizza at Domino's and Pizza Hut in the food court.",
        ),
        Rule::contains(
            "en.dessert",
            English,
            &["ice cream", "dessert"],
            "Amul and Baskin Robbins are in the food court.",
        ),
        Rule::contains(
            "en.coffee",
            English,
            &["coffee"],
            "CCD and Starbucks are located on Level 1 beside the escalator.",
        ),
        Rule::contains(
            "en.burger",
            English,
            &["burger"],
            "McDonald's and Burger King are in the food court.",
        ),
        Rule::contains(
            "en.restaurant",
            English,
            &["restaurant"],
            "There are multiple restaurants on Level 2 in the food court area.",
        ),
        // Services
        Rule::contains(
            "en.parking",
            English,
            &["parking"],
            "Parking is available in the basement. Entry from Gate 2.",
        ),
        Rule::contains(
            "en.wheelchair",
            English,
            &["wheelchair"],
            "Wheelchairs are available at the help desk near Gate 1.",
        ),
        Rule::contains(
            "en.stroller",
            English,
            &["baby", "stroller"],
            "Baby strollers can be borrowed at the customer service counter.",
        ),
        Rule::contains(
            "en.charging",
            English,
            &["charging", "charger"],
            "Charging stations are available near the seating lounges on each floor.",
        ),
        Rule::contains(
            "en.locker",
            English,
            &["locker", "storage"],
            "Lockers are available on the basement floor near the parking entry.",
        ),
        // Meta
        Rule::contains(
            "en.identity",
            English,
            &["who are you", "your name"],
            "I am Mall Assistant Bot, your virtual guide!",
        ),
    ]
}
