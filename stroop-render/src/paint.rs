//! Maps a `Screen` onto draw calls against any `Surface`.
//!
//! Font sizes scale with the surface width so the layout holds on any
//! display: large text is 1/48 of the width, small text 1/61, the stimulus
//! word 1/23 (all in points).

use stroop_core::{InkColor, Rgba, Screen, Surface, Verdict, surface::WHITE};

const PT_TO_PX: f32 = 4.0 / 3.0;
const HEADING_Y: f32 = 40.0;
const RULE_Y: f32 = 60.0;
const RULE_HALF_WIDTH: f32 = 600.0;
const BODY_TOP: f32 = 90.0;
const CLOSING_PT: f32 = 21.0;
const NOTICE_PT: f32 = 16.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Layout {
    pub width: f32,
    pub height: f32,
    pub large_px: f32,
    pub small_px: f32,
    pub stimulus_px: f32,
    /// Vertical distance between body lines.
    pub line_small: f32,
    /// Radius of the mask circle.
    pub mask_radius: f32,
}

impl Layout {
    pub fn for_size(width: f32, height: f32) -> Self {
        let large = width / 48.0;
        let small = width / 61.0;
        let stimulus = width / 23.0;
        Self {
            width,
            height,
            large_px: large * PT_TO_PX,
            small_px: small * PT_TO_PX,
            stimulus_px: stimulus * PT_TO_PX,
            line_small: small * 2.0,
            mask_radius: stimulus,
        }
    }

    fn center(&self) -> (f32, f32) {
        (self.width / 2.0, self.height / 2.0)
    }
}

/// One row of the instruction pages.
enum Line {
    Plain(&'static str),
    Inked(&'static str, InkColor),
    /// Two inked entries at one and two thirds of the width.
    KeyPair((&'static str, InkColor), (&'static str, InkColor)),
}

const KEYS_RB: Line = Line::KeyPair(("R (red)", InkColor::Red), ("B (blue)", InkColor::Blue));
const KEYS_YG: Line = Line::KeyPair(("Y (yellow)", InkColor::Yellow), ("G (green)", InkColor::Green));

const PRACTICE_INSTRUCTIONS: &[Line] = &[
    Line::Plain("In this task you will see colour names"),
    Line::Plain("(YELLOW, BLUE, RED, GREEN)"),
    Line::Plain("each printed in a different colour,"),
    Line::Plain("followed by a white cross in the centre of the screen"),
    Line::Plain("Your task is to respond to the print colour of the word."),
    Line::Plain("So, for example, if you see"),
    Line::Inked("GREEN", InkColor::Red),
    Line::Plain("You need to respond with the printed colour, (i.e. red)."),
    Line::Plain("You respond using the keys on your keyboard."),
    KEYS_RB,
    KEYS_YG,
    Line::Plain("Try to ignore the meaning of the word, and look at the printed colour"),
    Line::Plain("You can still answer when the white cross is on the screen."),
    Line::Plain("You will now have a practice round to try this out before completing the task."),
    Line::Plain("Press the SPACE BAR to begin."),
];

const TASK_INSTRUCTIONS: &[Line] = &[
    Line::Plain("In the main task, again you will see the same"),
    Line::Plain("colour name, each printed in a different colour."),
    Line::Plain("You will NO LONGER RECEIVE FEEDBACK on your answers."),
    Line::Plain("Your task is to respond to the print colour of the word."),
    Line::Plain("So, for example, if you see"),
    Line::Inked("GREEN", InkColor::Red),
    Line::Plain("You need to respond with the printed colour, (i.e. red)."),
    Line::Plain("You respond using the keys on your keyboard."),
    KEYS_RB,
    KEYS_YG,
    Line::Plain("Try to ignore the meaning of the word, and look at the printed colour"),
    Line::Plain("You can still answer when the white cross is on the screen."),
    Line::Plain("Press the SPACE BAR to begin."),
];

const CLOSING: [&str; 3] = [
    "Thank you for completing the task.",
    "Please continue with the survey by pressing the arrow",
    "at the bottom right hand corner of the screen.",
];

/// Clears the surface and draws `screen` on it.
pub fn paint(screen: &Screen, surface: &mut impl Surface) {
    let (w, h) = surface.size();
    let layout = Layout::for_size(w, h);
    surface.clear();

    match screen {
        Screen::Legibility => legibility(&layout, surface),
        Screen::Instructions => {
            instructions("STROOP Task Instructions", PRACTICE_INSTRUCTIONS, &layout, surface)
        }
        Screen::TaskIntro => instructions("Main Task Instructions", TASK_INSTRUCTIONS, &layout, surface),
        Screen::Fixation => fixation(&layout, surface),
        Screen::Stimulus { word, color } => {
            let (cx, cy) = layout.center();
            surface.fill_text(word.name(), cx, cy, layout.stimulus_px, color.rgba());
        }
        Screen::Blank => {}
        Screen::Feedback {
            verdict,
            resume_in_secs,
        } => feedback(*verdict, *resume_in_secs, &layout, surface),
        Screen::Break {
            practice,
            seconds_left,
        } => rest(*practice, *seconds_left, &layout, surface),
        Screen::Closing => {
            let (cx, cy) = layout.center();
            for (line, dy) in CLOSING.iter().zip([-80.0, -30.0, 20.0]) {
                surface.fill_text(line, cx, cy + dy, CLOSING_PT * PT_TO_PX, WHITE);
            }
        }
        Screen::ForcedStop => surface.fill_text(
            "The Task has been stopped forcefully.",
            w / 2.0,
            h - 30.0,
            NOTICE_PT * PT_TO_PX,
            WHITE,
        ),
        Screen::Fault { phase, detail } => {
            let size = NOTICE_PT * PT_TO_PX;
            if !detail.is_empty() {
                surface.fill_text(detail, w / 2.0, h - 90.0, size, WHITE);
            }
            surface.fill_text(&format!("PHASE is {phase}"), w / 2.0, h - 60.0, size, WHITE);
            surface.fill_text(
                "An issue has occurred. Please refresh the page",
                w / 2.0,
                h - 30.0,
                size,
                WHITE,
            );
        }
    }
}

fn legibility(layout: &Layout, surface: &mut impl Surface) {
    let (w, h) = (layout.width, layout.height);
    surface.fill_text(
        "Before you begin, can you read these words?",
        w / 2.0,
        75.0,
        layout.large_px,
        WHITE,
    );
    let cells = [
        (w / 3.0, h / 2.0 - 60.0),
        (w / 3.0 * 2.0, h / 2.0 - 60.0),
        (w / 3.0, h / 2.0 + 60.0),
        (w / 3.0 * 2.0, h / 2.0 + 60.0),
    ];
    for (color, (x, y)) in InkColor::ALL.iter().zip(cells) {
        surface.fill_text(color.name(), x, y, layout.stimulus_px, WHITE);
    }
    surface.fill_text("YES => Press Y", w / 3.0, h - 75.0, layout.large_px, WHITE);
    surface.fill_text("NO => Press N", w - w / 3.0, h - 75.0, layout.large_px, WHITE);
}

fn instructions(heading: &str, lines: &[Line], layout: &Layout, surface: &mut impl Surface) {
    let cx = layout.width / 2.0;
    surface.fill_text(heading, cx, HEADING_Y, layout.large_px, WHITE);
    surface.stroke_line(
        (cx - RULE_HALF_WIDTH, RULE_Y),
        (cx + RULE_HALF_WIDTH, RULE_Y),
        3.0,
        WHITE,
    );
    for (i, line) in lines.iter().enumerate() {
        let y = BODY_TOP + layout.line_small * i as f32;
        match line {
            Line::Plain(text) => surface.fill_text(text, cx, y, layout.small_px, WHITE),
            Line::Inked(text, ink) => surface.fill_text(text, cx, y, layout.small_px, ink.rgba()),
            Line::KeyPair((left, left_ink), (right, right_ink)) => {
                let third = layout.width / 3.0;
                surface.fill_text(left, third, y, layout.small_px, left_ink.rgba());
                surface.fill_text(right, third * 2.0, y, layout.small_px, right_ink.rgba());
            }
        }
    }
}

/// White "X" inside a circle, used before trials and as the stimulus mask.
fn fixation(layout: &Layout, surface: &mut impl Surface) {
    let (cx, cy) = layout.center();
    surface.stroke_circle(cx, cy - layout.mask_radius / 2.0, layout.mask_radius, 3.0, WHITE);
    surface.fill_text("X", cx, cy, layout.stimulus_px, WHITE);
}

fn feedback(verdict: Verdict, resume_in_secs: u64, layout: &Layout, surface: &mut impl Surface) {
    let (cx, cy) = layout.center();
    surface.fill_text(verdict.message(), cx, cy - 150.0, layout.stimulus_px, WHITE);
    surface.fill_text(
        &format!("The test will continue in {resume_in_secs} seconds"),
        cx,
        560.0_f32.min(layout.height - 40.0),
        layout.large_px,
        WHITE,
    );
}

fn rest(practice: bool, seconds_left: u64, layout: &Layout, surface: &mut impl Surface) {
    let lines: Vec<String> = if practice {
        vec![
            "You've completed the first practice.".into(),
            "Take a moment to have a break.".into(),
            "Remember - you need to respond with the PRINTED colour of the word.".into(),
            format!("The next practice round starts in {seconds_left} seconds."),
        ]
    } else {
        vec![
            "You are halfway through the task.".into(),
            "Take a moment to have a break.".into(),
            format!("The task will resume in {seconds_left} seconds."),
        ]
    };
    let (cx, cy) = layout.center();
    for (i, line) in lines.iter().enumerate() {
        surface.fill_text(line, cx, cy + 60.0 * i as f32, layout.large_px, WHITE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Op {
        Clear,
        Text(String, f32, f32, f32, Rgba),
        Circle(f32, f32, f32),
        Line,
    }

    struct Recorder {
        size: (f32, f32),
        ops: Vec<Op>,
    }

    impl Recorder {
        fn new(w: f32, h: f32) -> Self {
            Self {
                size: (w, h),
                ops: Vec::new(),
            }
        }

        fn texts(&self) -> Vec<&str> {
            self.ops
                .iter()
                .filter_map(|op| match op {
                    Op::Text(t, ..) => Some(t.as_str()),
                    _ => None,
                })
                .collect()
        }
    }

    impl Surface for Recorder {
        fn size(&self) -> (f32, f32) {
            self.size
        }
        fn clear(&mut self) {
            self.ops.push(Op::Clear);
        }
        fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Rgba) {
            self.ops.push(Op::Text(text.to_string(), x, y, size, color));
        }
        fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, _width: f32, _color: Rgba) {
            self.ops.push(Op::Circle(cx, cy, radius));
        }
        fn stroke_line(&mut self, _from: (f32, f32), _to: (f32, f32), _width: f32, _color: Rgba) {
            self.ops.push(Op::Line);
        }
    }

    #[test]
    fn font_sizes_follow_width() {
        let layout = Layout::for_size(1_840.0, 1_000.0);
        assert!((layout.stimulus_px - 80.0 * PT_TO_PX).abs() < 1e-3);
        assert!((layout.mask_radius - 80.0).abs() < 1e-3);
        assert!(layout.large_px > layout.small_px);
    }

    #[test]
    fn stimulus_is_the_word_in_its_ink_at_center() {
        let mut r = Recorder::new(1_840.0, 1_000.0);
        paint(
            &Screen::Stimulus {
                word: InkColor::Green,
                color: InkColor::Red,
            },
            &mut r,
        );
        assert_eq!(r.ops.len(), 2);
        assert_eq!(r.ops[0], Op::Clear);
        match &r.ops[1] {
            Op::Text(text, x, y, _, color) => {
                assert_eq!(text, "GREEN");
                assert_eq!((*x, *y), (920.0, 500.0));
                assert_eq!(*color, InkColor::Red.rgba());
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn mask_is_a_circled_cross() {
        let mut r = Recorder::new(1_840.0, 1_000.0);
        paint(&Screen::Fixation, &mut r);
        assert_eq!(r.ops[1], Op::Circle(920.0, 460.0, 80.0));
        assert_eq!(r.texts(), ["X"]);
    }

    #[test]
    fn blank_only_clears() {
        let mut r = Recorder::new(800.0, 600.0);
        paint(&Screen::Blank, &mut r);
        assert_eq!(r.ops, [Op::Clear]);
    }

    #[test]
    fn break_variants_show_their_countdown() {
        let mut r = Recorder::new(800.0, 600.0);
        paint(
            &Screen::Break {
                practice: false,
                seconds_left: 7,
            },
            &mut r,
        );
        assert!(r.texts().contains(&"The task will resume in 7 seconds."));

        let mut r = Recorder::new(800.0, 600.0);
        paint(
            &Screen::Break {
                practice: true,
                seconds_left: 3,
            },
            &mut r,
        );
        assert!(r.texts().contains(&"The next practice round starts in 3 seconds."));
    }

    #[test]
    fn feedback_shows_verdict_and_resume_time() {
        let mut r = Recorder::new(1_600.0, 900.0);
        paint(
            &Screen::Feedback {
                verdict: Verdict::TooSlow,
                resume_in_secs: 3,
            },
            &mut r,
        );
        assert_eq!(
            r.texts(),
            [
                "Correct, but try to be faster...",
                "The test will continue in 3 seconds"
            ]
        );
    }

    #[test]
    fn instruction_pages_have_a_rule_and_inked_example() {
        let mut r = Recorder::new(1_600.0, 900.0);
        paint(&Screen::Instructions, &mut r);
        assert!(r.ops.contains(&Op::Line));
        let example = r.ops.iter().find_map(|op| match op {
            Op::Text(t, _, _, _, c) if t == "GREEN" => Some(*c),
            _ => None,
        });
        assert_eq!(example, Some(InkColor::Red.rgba()));
        assert_eq!(r.texts().last(), Some(&"Press the SPACE BAR to begin."));

        let mut r = Recorder::new(1_600.0, 900.0);
        paint(&Screen::TaskIntro, &mut r);
        assert_eq!(r.texts()[0], "Main Task Instructions");
    }

    #[test]
    fn legibility_lists_every_color_word() {
        let mut r = Recorder::new(1_200.0, 800.0);
        paint(&Screen::Legibility, &mut r);
        let texts = r.texts();
        for color in InkColor::ALL {
            assert!(texts.contains(&color.name()));
        }
        assert!(texts.contains(&"NO => Press N"));
    }

    #[test]
    fn fault_names_the_phase() {
        let mut r = Recorder::new(800.0, 600.0);
        paint(
            &Screen::Fault {
                phase: "task".into(),
                detail: String::new(),
            },
            &mut r,
        );
        assert_eq!(
            r.texts(),
            [
                "PHASE is task",
                "An issue has occurred. Please refresh the page"
            ]
        );
    }
}
