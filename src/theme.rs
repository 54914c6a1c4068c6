use clap::ValueEnum;

/// Named colors (ANSI SGR codes) used to mark up interpreted rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Theme {
    pub selection: String,
    pub queued: String,
    pub free: String,
    pub error: String,
    pub warning: String,
    pub low: String,
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            selection: "1;32;40".to_string(),
            queued: "0;37".to_string(),
            free: "1;32".to_string(),
            error: "9;31".to_string(),
            warning: "1;31".to_string(),
            low: "1;36".to_string(),
        }
    }

    pub fn none() -> Self {
        Theme::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ThemeName {
    #[default]
    Dark,
    None,
}

impl ThemeName {
    pub fn theme(self) -> Theme {
        match self {
            ThemeName::Dark => Theme::dark(),
            ThemeName::None => Theme::none(),
        }
    }
}
