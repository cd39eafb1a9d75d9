/// ESC-50 class names paired with a display emoji.
///
/// Purely presentational lookup for the prediction panel; classes the model
/// grows that we do not know yet fall back to [`FALLBACK_EMOJI`].
const ESC50_EMOJI: &[(&str, &str)] = &[
    ("dog", "🐶"),
    ("rooster", "🐓"),
    ("pig", "🐷"),
    ("cow", "🐄"),
    ("frog", "🐸"),
    ("cat", "🐱"),
    ("hen", "🐔"),
    ("insects", "🐝"),
    ("sheep", "🐑"),
    ("crow", "🐦"),
    ("rain", "🌧️"),
    ("sea_waves", "🌊"),
    ("crackling_fire", "🔥"),
    ("crickets", "🦗"),
    ("chirping_birds", "🐦🎶"),
    ("water_drops", "💧"),
    ("wind", "💨"),
    ("pouring_water", "🚰"),
    ("toilet_flush", "🚽"),
    ("thunderstorm", "⛈️"),
    ("crying_baby", "👶😭"),
    ("sneezing", "🤧"),
    ("clapping", "👏"),
    ("breathing", "😮‍💨"),
    ("coughing", "😷"),
    ("footsteps", "👣"),
    ("laughing", "😂"),
    ("brushing_teeth", "🪥"),
    ("snoring", "😴"),
    ("drinking_sipping", "🥤"),
    ("door_wood_knock", "🚪👊"),
    ("mouse_click", "🖱️"),
    ("keyboard_typing", "⌨️"),
    ("door_wood_creaks", "🚪😬"),
    ("can_opening", "🥫"),
    ("washing_machine", "🧺"),
    ("vacuum_cleaner", "🧹"),
    ("clock_alarm", "⏰"),
    ("clock_tick", "🕰️"),
    ("glass_breaking", "🥂💥"),
    ("helicopter", "🚁"),
    ("chainsaw", "🪚"),
    ("siren", "🚨"),
    ("car_horn", "🚗📢"),
    ("engine", "🔧🚗"),
    ("train", "🚆"),
    ("church_bells", "🔔⛪"),
    ("airplane", "✈️"),
    ("fireworks", "🎆"),
    ("hand_saw", "🪚✋"),
];

pub const FALLBACK_EMOJI: &str = "❤️";

/// Emoji for a class name, with a fallback for unknown classes.
pub fn emoji_for(class_name: &str) -> &'static str {
    ESC50_EMOJI
        .iter()
        .find(|(name, _)| *name == class_name)
        .map(|(_, emoji)| *emoji)
        .unwrap_or(FALLBACK_EMOJI)
}

/// Human-readable form of a class name ("sea_waves" -> "sea waves").
pub fn display_name(class_name: &str) -> String {
    class_name.replace('_', " ")
}
