//! State rendering for the operator echo and the persistent sink.
//!
//! A [`StateWriter`] is configured once from [`RenderSettings`] and the
//! program's comment map. Rendering reads snapshots only; the single output
//! path a batch can fail on is the underlying writer.

use std::io::{self, Write};

use serde::{Deserialize, Serialize};
use serde_json::json;
use ticksim_core::{Flag, Flags, ProcState, Register};

use crate::source::Comments;

/// Output encoding for rendered states.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Human-readable block per state.
    #[default]
    Text,
    /// One JSON object per line.
    Json,
}

/// Number base for register and memory values in text output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Radix {
    /// Decimal.
    #[default]
    Dec,
    /// `0x`-prefixed, four hex digits.
    Hex,
    /// `0b`-prefixed, sixteen binary digits.
    Bin,
}

impl Radix {
    /// Formats one 16-bit word.
    #[must_use]
    pub fn format(self, value: u16) -> String {
        match self {
            Self::Dec => value.to_string(),
            Self::Hex => format!("0x{value:04X}"),
            Self::Bin => format!("0b{value:016b}"),
        }
    }
}

/// Renderer settings read from the `writer` file.
///
/// Every field is optional in the JSON document.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RenderSettings {
    /// Output encoding.
    #[serde(default)]
    pub format: Format,
    /// Number base for values in text output.
    #[serde(default)]
    pub radix: Radix,
    /// Whether data memory is rendered.
    #[serde(default = "RenderSettings::default_show_memory")]
    pub show_memory: bool,
    /// Whether zero memory words are left out.
    #[serde(default)]
    pub hide_zero_memory: bool,
    /// Whether the comment of the next line is shown.
    #[serde(default = "RenderSettings::default_show_comments")]
    pub show_comments: bool,
    /// Appended to every flag that changed since the reference.
    #[serde(default = "RenderSettings::default_changed_marker")]
    pub changed_marker: String,
    /// Title used in the batch header and footer.
    #[serde(default = "RenderSettings::default_title")]
    pub title: String,
}

impl RenderSettings {
    const fn default_show_memory() -> bool {
        true
    }

    const fn default_show_comments() -> bool {
        true
    }

    fn default_changed_marker() -> String {
        "*".to_string()
    }

    fn default_title() -> String {
        "ticksim".to_string()
    }

    /// Parses settings from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error for malformed JSON, unknown fields or
    /// values of the wrong type.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

impl Default for RenderSettings {
    fn default() -> Self {
        Self {
            format: Format::default(),
            radix: Radix::default(),
            show_memory: Self::default_show_memory(),
            hide_zero_memory: false,
            show_comments: Self::default_show_comments(),
            changed_marker: Self::default_changed_marker(),
            title: Self::default_title(),
        }
    }
}

#[derive(Serialize)]
struct StateRecord<'a> {
    #[serde(flatten)]
    state: &'a ProcState,
    changed: Vec<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    comment: Option<&'a str>,
}

/// Renders snapshots according to [`RenderSettings`].
#[derive(Debug, Clone, Default)]
pub struct StateWriter {
    settings: RenderSettings,
    comments: Comments,
}

impl StateWriter {
    /// Creates a writer with the program's comment map.
    #[must_use]
    pub const fn new(settings: RenderSettings, comments: Comments) -> Self {
        Self { settings, comments }
    }

    /// Active settings.
    #[must_use]
    pub const fn settings(&self) -> &RenderSettings {
        &self.settings
    }

    /// Writes the opening bracket of a batch.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn write_header<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self.settings.format {
            Format::Text => writeln!(out, "==== {} ====", self.settings.title),
            Format::Json => {
                serde_json::to_writer(&mut *out, &json!({ "begin": self.settings.title }))?;
                writeln!(out)
            }
        }
    }

    /// Writes one state, marking flags that differ from `reference`.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn write<W: Write + ?Sized>(
        &self,
        out: &mut W,
        state: &ProcState,
        reference: Flags,
    ) -> io::Result<()> {
        match self.settings.format {
            Format::Text => self.write_text(out, state, reference),
            Format::Json => self.write_json(out, state, reference),
        }
    }

    /// Writes the closing bracket of a batch.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn write_footer<W: Write + ?Sized>(&self, out: &mut W) -> io::Result<()> {
        match self.settings.format {
            Format::Text => writeln!(out, "==== end {} ====", self.settings.title),
            Format::Json => {
                serde_json::to_writer(&mut *out, &json!({ "end": self.settings.title }))?;
                writeln!(out)
            }
        }
    }

    /// Writes `entries` between exactly one header and one footer.
    ///
    /// # Errors
    ///
    /// Propagates I/O errors from `out`.
    pub fn write_batch<'a, W, I>(&self, out: &mut W, entries: I) -> io::Result<()>
    where
        W: Write + ?Sized,
        I: IntoIterator<Item = (&'a ProcState, Flags)>,
    {
        self.write_header(out)?;
        for (state, reference) in entries {
            self.write(out, state, reference)?;
        }
        self.write_footer(out)
    }

    fn comment_for(&self, state: &ProcState) -> Option<&str> {
        if !self.settings.show_comments {
            return None;
        }
        state
            .next_line()
            .and_then(|line| self.comments.get(&line))
            .map(String::as_str)
    }

    fn write_text<W: Write + ?Sized>(
        &self,
        out: &mut W,
        state: &ProcState,
        reference: Flags,
    ) -> io::Result<()> {
        write!(out, "clk {} | pc {} | ", state.clk(), state.pc())?;
        match state.next_line() {
            Some(line) => write!(out, "line {line}")?,
            None => write!(out, "halted")?,
        }
        if let Some(comment) = self.comment_for(state) {
            write!(out, " ; {comment}")?;
        }
        writeln!(out)?;

        let radix = self.settings.radix;
        let registers: Vec<String> = Register::ALL
            .iter()
            .map(|&reg| format!("{reg}={}", radix.format(state.register(reg))))
            .collect();
        writeln!(out, "  registers: {}", registers.join(" "))?;

        if self.settings.show_memory {
            let words: Vec<String> = state
                .memory()
                .iter()
                .enumerate()
                .filter(|&(_, &value)| !self.settings.hide_zero_memory || value != 0)
                .map(|(addr, &value)| format!("m{addr}={}", radix.format(value)))
                .collect();
            if words.is_empty() {
                writeln!(out, "  memory:    (all zero)")?;
            } else {
                writeln!(out, "  memory:    {}", words.join(" "))?;
            }
        }

        let flags = state.flags();
        let rendered: Vec<String> = flags
            .iter()
            .map(|(flag, set)| {
                let marker = if flags.is_set(flag) == reference.is_set(flag) {
                    ""
                } else {
                    self.settings.changed_marker.as_str()
                };
                format!("{}={}{marker}", flag.letter(), u8::from(set))
            })
            .collect();
        writeln!(out, "  flags:     {}", rendered.join(" "))
    }

    fn write_json<W: Write + ?Sized>(
        &self,
        out: &mut W,
        state: &ProcState,
        reference: Flags,
    ) -> io::Result<()> {
        let record = StateRecord {
            state,
            changed: state.flags().changed_from(reference).map(Flag::name).collect(),
            comment: self.comment_for(state),
        };
        serde_json::to_writer(&mut *out, &record)?;
        writeln!(out)
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use ticksim_core::{Command, Instruction, Processor, UnaryOp};

    use super::*;

    fn render(writer: &StateWriter, state: &ProcState, reference: Flags) -> String {
        let mut out = Vec::new();
        writer.write(&mut out, state, reference).expect("in-memory write");
        String::from_utf8(out).expect("utf-8 output")
    }

    fn dec_program() -> Processor {
        Processor::with_program(vec![
            Command::new(
                2,
                Instruction::Unary {
                    op: UnaryOp::Dec,
                    rd: Register::R0,
                },
            ),
            Command::new(3, Instruction::Halt),
        ])
        .expect("valid program")
    }

    #[test]
    fn settings_default_from_empty_document() {
        let settings = RenderSettings::from_json("{}").expect("empty settings");
        assert_eq!(settings, RenderSettings::default());
        assert!(settings.show_memory);
        assert_eq!(settings.changed_marker, "*");
        assert_eq!(settings.title, "ticksim");
    }

    #[test]
    fn settings_fields_are_read() {
        let settings = RenderSettings::from_json(
            r#"{"format": "json", "radix": "hex", "hide_zero_memory": true, "title": "run"}"#,
        )
        .expect("valid settings");
        assert_eq!(settings.format, Format::Json);
        assert_eq!(settings.radix, Radix::Hex);
        assert!(settings.hide_zero_memory);
        assert!(settings.show_comments);
        assert_eq!(settings.title, "run");
    }

    #[rstest]
    #[case(r#"{"radix": "oct"}"#)]
    #[case(r#"{"colour": true}"#)]
    #[case(r#"{"show_memory": "yes"}"#)]
    #[case("not json")]
    fn bad_settings_are_rejected(#[case] text: &str) {
        assert!(RenderSettings::from_json(text).is_err());
    }

    #[rstest]
    #[case(Radix::Dec, 42, "42")]
    #[case(Radix::Hex, 42, "0x002A")]
    #[case(Radix::Bin, 5, "0b0000000000000101")]
    fn radix_formats_words(#[case] radix: Radix, #[case] value: u16, #[case] expected: &str) {
        assert_eq!(radix.format(value), expected);
    }

    #[test]
    fn initial_state_renders_without_markers() {
        let processor = dec_program();
        let state = ProcState::of(&processor);
        let writer = StateWriter::new(RenderSettings::default(), Comments::new());

        let text = render(&writer, &state, state.flags());
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "clk 0 | pc 0 | line 2");
        assert_eq!(
            lines[1],
            "  registers: r0=0 r1=0 r2=0 r3=0 r4=0 r5=0 r6=0 r7=0"
        );
        assert!(lines[2].starts_with("  memory:    m0=0 m1=0"));
        assert!(lines[2].ends_with("m15=0"));
        assert_eq!(lines[3], "  flags:     Z=0 N=0 C=0 V=0");
        assert!(!text.contains('*'));
    }

    #[test]
    fn changed_flags_are_marked() {
        let mut processor = dec_program();
        let before = ProcState::of(&processor);
        processor.clk().expect("no fault");
        let after = ProcState::of(&processor);
        let settings = RenderSettings {
            changed_marker: "!".into(),
            show_memory: false,
            ..RenderSettings::default()
        };
        let writer = StateWriter::new(settings, Comments::new());

        let text = render(&writer, &after, before.flags());
        assert!(text.contains("r0=65535"));
        assert!(text.contains("flags:     Z=0 N=1! C=1! V=0"));
        assert!(!text.contains("memory"));
    }

    #[test]
    fn comment_of_the_next_line_is_shown() {
        let processor = dec_program();
        let state = ProcState::of(&processor);
        let comments = Comments::from([(2, "count down".to_string())]);

        let writer = StateWriter::new(RenderSettings::default(), comments.clone());
        assert!(render(&writer, &state, state.flags()).starts_with("clk 0 | pc 0 | line 2 ; count down\n"));

        let quiet = StateWriter::new(
            RenderSettings {
                show_comments: false,
                ..RenderSettings::default()
            },
            comments,
        );
        assert!(!render(&quiet, &state, state.flags()).contains("count down"));
    }

    #[test]
    fn halted_state_and_hidden_zero_memory() {
        let processor = Processor::new();
        let state = ProcState::of(&processor);
        let writer = StateWriter::new(
            RenderSettings {
                hide_zero_memory: true,
                radix: Radix::Hex,
                ..RenderSettings::default()
            },
            Comments::new(),
        );

        let text = render(&writer, &state, state.flags());
        assert!(text.starts_with("clk 0 | pc 0 | halted\n"));
        assert!(text.contains("r7=0x0000"));
        assert!(text.contains("memory:    (all zero)"));
    }

    #[test]
    fn json_records_carry_state_and_changes() {
        let mut processor = dec_program();
        let before = ProcState::of(&processor);
        processor.clk().expect("no fault");
        let after = ProcState::of(&processor);
        let writer = StateWriter::new(
            RenderSettings {
                format: Format::Json,
                ..RenderSettings::default()
            },
            Comments::from([(3, "stop".to_string())]),
        );

        let text = render(&writer, &after, before.flags());
        let value: serde_json::Value = serde_json::from_str(text.trim_end()).expect("valid json");
        assert_eq!(value["clk"], 1);
        assert_eq!(value["pc"], 1);
        assert_eq!(value["next_line"], 3);
        assert_eq!(value["registers"][0], 65535);
        assert_eq!(value["flags"]["negative"], true);
        assert_eq!(value["changed"], json!(["negative", "carry"]));
        assert_eq!(value["comment"], "stop");
    }

    #[test]
    fn batch_has_one_header_and_footer() {
        let processor = dec_program();
        let state = ProcState::of(&processor);
        let writer = StateWriter::new(RenderSettings::default(), Comments::new());

        let mut out = Vec::new();
        writer
            .write_batch(&mut out, [(&state, state.flags()), (&state, state.flags())])
            .expect("in-memory write");
        let text = String::from_utf8(out).expect("utf-8 output");

        assert!(text.starts_with("==== ticksim ====\n"));
        assert!(text.ends_with("==== end ticksim ====\n"));
        assert_eq!(text.matches("==== ticksim ====").count(), 1);
        assert_eq!(text.matches("clk 0 |").count(), 2);
    }

    #[test]
    fn empty_json_batch_is_still_bracketed() {
        let writer = StateWriter::new(
            RenderSettings {
                format: Format::Json,
                title: "t".into(),
                ..RenderSettings::default()
            },
            Comments::new(),
        );
        let mut out = Vec::new();
        writer
            .write_batch(&mut out, std::iter::empty())
            .expect("in-memory write");
        assert_eq!(
            String::from_utf8(out).expect("utf-8 output"),
            "{\"begin\":\"t\"}\n{\"end\":\"t\"}\n"
        );
    }
}
