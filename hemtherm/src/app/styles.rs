use owo_colors::Style;

// Stylesheet used to colorize prints.
#[derive(Debug, Default)]
pub(crate) struct Styles {
    pub device_style: Style,
    pub layer_style: Style,
    pub value_style: Style,
    pub warning_style: Style,
    pub error_style: Style,
}

impl Styles {
    /// Styles for stdout, coloured only when the terminal supports it
    pub(crate) fn for_stdout() -> Self {
        let mut styles = Self::default();
        if supports_color::on(supports_color::Stream::Stdout).is_some() {
            styles.colorize();
        }
        styles
    }

    pub(crate) fn colorize(&mut self) {
        self.device_style = Style::new().bright_blue().bold();
        self.layer_style = Style::new().bright_green();
        self.value_style = Style::new().bright_white().bold();
        self.warning_style = Style::new().yellow();
        self.error_style = Style::new().bright_red().bold();
    }
}
