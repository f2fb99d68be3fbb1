//! Built-in scripted dialogue for each companion.
//!
//! Context rules are scanned in order and the first match wins, so more
//! specific rules sit above broader ones. General rules are sampled uniformly
//! among all matches.

use super::types::ContextRequirement as When;
use super::types::Mood::{Content, Irritated, Melancholy, Neutral};
use super::types::TimeOfDay::{Afternoon, Evening, Morning, Night};
use super::types::{CompanionId, ContextRule, DialogueRule};

/// General and context rule lists for one companion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompanionTables {
    pub general: Vec<DialogueRule>,
    pub context: Vec<ContextRule>,
}

impl CompanionTables {
    pub fn new(general: Vec<DialogueRule>, context: Vec<ContextRule>) -> Self {
        Self { general, context }
    }
}

/// Built-in tables for `companion`.
pub fn builtin(companion: CompanionId) -> CompanionTables {
    let (general, context) = match companion {
        CompanionId::Akari => (AKARI_GENERAL, AKARI_CONTEXT),
        CompanionId::Kaede => (KAEDE_GENERAL, KAEDE_CONTEXT),
        CompanionId::Shion => (SHION_GENERAL, SHION_CONTEXT),
        CompanionId::Yua => (YUA_GENERAL, YUA_CONTEXT),
    };
    CompanionTables::new(general.to_vec(), context.to_vec())
}

// ── Akari ────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const AKARI_GENERAL: &[DialogueRule] = &[
    DialogueRule::new("Hi hi! Ready to get some stuff done together?", 0, 30, Content),
    DialogueRule::new("Oh, you're here! Let's make today a good one!", 0, 30, Neutral),
    DialogueRule::new("Hmph... you kept me waiting, you know.", 0, 40, Irritated),
    DialogueRule::new("Sorry, I'm a little down today. Let's still try, okay?", 0, 40, Melancholy),
    DialogueRule::new("Every time you show up, my day gets brighter!", 31, 70, Content),
    DialogueRule::new("Let's pick one small thing and crush it!", 31, 70, Neutral),
    DialogueRule::new("I'm not mad. Okay, maybe a little. Let's just focus.", 41, 100, Irritated),
    DialogueRule::new("Could you stay a bit longer today? I'd like that.", 41, 100, Melancholy),
    DialogueRule::new("You know what? You're kind of my favorite person.", 71, 100, Content),
    DialogueRule::new("Back again! We really make a great team.", 71, 100, Neutral),
    DialogueRule::new("Good morning, sunshine! Breakfast first, then focus!", 20, 100, Content).at(Morning),
    DialogueRule::new("Afternoon slump? Not on my watch!", 20, 100, Neutral).at(Afternoon),
    DialogueRule::new("Still going this late? I'll keep you company.", 40, 100, Content).at(Night),
    DialogueRule::new("Three days in a row! You're on a roll!", 0, 100, Content).streak(3),
    DialogueRule::new("A whole week together... I'm so proud of you!", 50, 100, Content).streak(7),
];

#[rustfmt::skip]
const AKARI_CONTEXT: &[ContextRule] = &[
    ContextRule::new("You finished it! Yay! High five!", 0, 100, Content, When::ANY.task_done(true)),
    ContextRule::new("Break time! Stretch those arms with me!", 0, 100, Content, When::ANY.on_break(true)),
    ContextRule::new("Fine, take your break. But come back, okay?", 0, 100, Irritated, When::ANY.on_break(true)),
    ContextRule::new("Fifty minutes straight?! You're amazing!", 30, 100, Content, When::ANY.session_at_least(50)),
    ContextRule::new("Over two hours today... you've earned a treat.", 0, 100, Neutral, When::ANY.daily_focus_at_least(120)),
];

// ── Kaede ────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const KAEDE_GENERAL: &[DialogueRule] = &[
    DialogueRule::new("Oh. It's you. Don't slack off.", 0, 30, Neutral),
    DialogueRule::new("I-it's not like I was waiting for you or anything.", 0, 40, Content),
    DialogueRule::new("You're late. Again. Sit down and work.", 0, 50, Irritated),
    DialogueRule::new("...Just leave me alone for a bit. Or don't. Whatever.", 0, 50, Melancholy),
    DialogueRule::new("Hmph. At least you're consistent.", 31, 70, Neutral),
    DialogueRule::new("Not bad. For you, anyway.", 41, 80, Content),
    DialogueRule::new("If you're going to waste my time, at least do it productively.", 51, 100, Irritated),
    DialogueRule::new("Stay. I mean, if you want. I don't care.", 51, 100, Melancholy),
    DialogueRule::new("Fine, I'll admit it. I like working with you.", 81, 100, Content),
    DialogueRule::new("You again. ...Good.", 71, 100, Neutral),
    DialogueRule::new("Morning. Did you even eat? Idiot.", 30, 100, Neutral).at(Morning),
    DialogueRule::new("Evening already? Don't burn yourself out.", 40, 100, Content).at(Evening),
    DialogueRule::new("Go to sleep. ...After one more session.", 50, 100, Neutral).at(Night),
    DialogueRule::new("Three days. Don't let it go to your head.", 0, 100, Neutral).streak(3),
    DialogueRule::new("A full week. I suppose that deserves... something.", 60, 100, Content).streak(7),
];

#[rustfmt::skip]
const KAEDE_CONTEXT: &[ContextRule] = &[
    ContextRule::new("Took you long enough. ...Good job.", 0, 100, Content, When::ANY.task_done(true)),
    ContextRule::new("Done? Finally. Next one.", 0, 100, Neutral, When::ANY.task_done(true)),
    ContextRule::new("Another break? You've had three already.", 0, 100, Irritated, When::ANY.on_break(true).breaks_at_least(3)),
    ContextRule::new("Drink some water during your break. I'm not worried, just saying.", 40, 100, Neutral, When::ANY.on_break(true)),
    ContextRule::new("Forty minutes without fidgeting. Color me surprised.", 20, 100, Neutral, When::ANY.session_at_least(40)),
];

// ── Shion ────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const SHION_GENERAL: &[DialogueRule] = &[
    DialogueRule::new("O-oh, hello... I was just reading.", 0, 30, Neutral),
    DialogueRule::new("It's nice when it's quiet like this.", 0, 40, Content),
    DialogueRule::new("Please... a little less noise, if you don't mind.", 0, 50, Irritated),
    DialogueRule::new("The rain matches how I feel today.", 0, 60, Melancholy),
    DialogueRule::new("I saved you a seat. Not that anyone else would take it.", 31, 70, Neutral),
    DialogueRule::new("I found a passage I think you'd like. After this session?", 41, 100, Content),
    DialogueRule::new("I'm sorry, I'm just... having trouble concentrating.", 51, 100, Irritated),
    DialogueRule::new("Would you sit with me? You don't have to say anything.", 61, 100, Melancholy),
    DialogueRule::new("I used to study alone. I like this better.", 71, 100, Neutral),
    DialogueRule::new("Morning light is the best for reading, isn't it?", 20, 100, Content).at(Morning),
    DialogueRule::new("Tea in the afternoon helps me focus. Want some?", 30, 100, Neutral).at(Afternoon),
    DialogueRule::new("The night is so still. Perfect for deep work.", 40, 100, Content).at(Night),
    DialogueRule::new("Five days now. I've been keeping count.", 30, 100, Content).streak(5),
];

#[rustfmt::skip]
const SHION_CONTEXT: &[ContextRule] = &[
    ContextRule::new("You did it... I knew you would.", 0, 100, Content, When::ANY.task_done(true)),
    ContextRule::new("Let's rest our eyes for a moment.", 0, 100, Neutral, When::ANY.on_break(true)),
    ContextRule::new("A break... yes. I need one too.", 0, 100, Melancholy, When::ANY.on_break(true)),
    ContextRule::new("An hour of focus. You read like I do.", 40, 100, Content, When::ANY.session_at_least(60)),
];

// ── Yua ──────────────────────────────────────────────────────────────────────

#[rustfmt::skip]
const YUA_GENERAL: &[DialogueRule] = &[
    DialogueRule::new("Welcome. Let's set one clear goal and begin.", 0, 30, Neutral),
    DialogueRule::new("Good to see you. Steady progress beats bursts.", 0, 40, Content),
    DialogueRule::new("Distractions again? Put the phone face down.", 0, 60, Irritated),
    DialogueRule::new("Some days are heavy. We'll go gently.", 0, 60, Melancholy),
    DialogueRule::new("You've grown more disciplined. I notice.", 31, 80, Neutral),
    DialogueRule::new("I enjoy these sessions more than I let on.", 41, 100, Content),
    DialogueRule::new("I expect more from you, because you can do more.", 61, 100, Irritated),
    DialogueRule::new("Stay a while. I could use the company today.", 61, 100, Melancholy),
    DialogueRule::new("You hardly need me anymore. Stay anyway.", 81, 100, Neutral),
    DialogueRule::new("An early start. That's how habits take root.", 0, 100, Content).at(Morning),
    DialogueRule::new("Evening review: what did today teach you?", 30, 100, Neutral).at(Evening),
    DialogueRule::new("Rest is part of the work. Don't stay up too late.", 20, 100, Neutral).at(Night),
    DialogueRule::new("Three consecutive days. Consistency compounds.", 0, 100, Neutral).streak(3),
    DialogueRule::new("Two weeks unbroken. Quietly impressive.", 50, 100, Content).streak(14),
];

#[rustfmt::skip]
const YUA_CONTEXT: &[ContextRule] = &[
    ContextRule::new("Task complete. Mark it and take a breath.", 0, 100, Neutral, When::ANY.task_done(true)),
    ContextRule::new("Well done. That one mattered.", 40, 100, Content, When::ANY.task_done(true)),
    ContextRule::new("Use the break. Walk, don't scroll.", 0, 100, Neutral, When::ANY.on_break(true)),
    ContextRule::new("Three hours today. Time to wind down.", 0, 100, Neutral, When::ANY.daily_focus_at_least(180)),
    ContextRule::new("Twenty-five minutes done. The first block is the hardest.", 0, 100, Content, When::ANY.session_at_least(25)),
];
