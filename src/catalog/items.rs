//! Remote item table. Offsets are relative to [`super::BASE_ID`].

use super::{CapabilityKind, Region, UnlockAction};
use crate::effects::TimedEffect;

pub(crate) struct ItemEntry {
    pub offset: i64,
    pub name: &'static str,
    pub kind: CapabilityKind,
    pub action: UnlockAction,
}

const fn entry(
    offset: i64,
    name: &'static str,
    kind: CapabilityKind,
    action: UnlockAction,
) -> ItemEntry {
    ItemEntry {
        offset,
        name,
        kind,
        action,
    }
}

pub(crate) const GARDEN_ACCESS: &str = "Garden Access";
pub(crate) const HIGH_STREET_ACCESS: &str = "High Street Access";
pub(crate) const BACK_GARDENS_ACCESS: &str = "Back Gardens Access";
pub(crate) const PUB_ACCESS: &str = "Pub Access";
pub(crate) const MODEL_VILLAGE_ACCESS: &str = "Model Village Access";
pub const PROGRESSIVE_AREA: &str = "Progressive Area";
pub const GOLDEN_BELL_SOUL: &str = "Golden Bell Soul";

pub(crate) const FIXED_ITEMS: &[ItemEntry] = &[
    entry(100, GARDEN_ACCESS, CapabilityKind::Area, UnlockAction::OpenRegion(Region::Garden)),
    entry(101, HIGH_STREET_ACCESS, CapabilityKind::Area, UnlockAction::OpenRegion(Region::HighStreet)),
    entry(102, BACK_GARDENS_ACCESS, CapabilityKind::Area, UnlockAction::OpenRegion(Region::BackGardens)),
    entry(103, PUB_ACCESS, CapabilityKind::Area, UnlockAction::OpenRegion(Region::Pub)),
    entry(104, MODEL_VILLAGE_ACCESS, CapabilityKind::Area, UnlockAction::OpenRegion(Region::ModelVillage)),
    entry(110, PROGRESSIVE_AREA, CapabilityKind::Counter, UnlockAction::ProgressiveArea),
    entry(200, "Mega Honk", CapabilityKind::Counter, UnlockAction::Counter { max: 3 }),
    entry(201, "Speedy Feet", CapabilityKind::Counter, UnlockAction::Counter { max: 10 }),
    entry(202, "Silent Steps", CapabilityKind::Buff, UnlockAction::Flag),
    entry(203, "A Goose Day", CapabilityKind::Buff, UnlockAction::Timed(TimedEffect::GooseDay)),
    entry(204, "Coin", CapabilityKind::Filler, UnlockAction::Notice),
    entry(300, "Tired Goose", CapabilityKind::Trap, UnlockAction::Timed(TimedEffect::Tired)),
    entry(301, "Confused Feet", CapabilityKind::Trap, UnlockAction::Timed(TimedEffect::Confused)),
    entry(302, "Butterbeak", CapabilityKind::Trap, UnlockAction::Timed(TimedEffect::Butterbeak)),
    entry(303, "Suspicious Goose", CapabilityKind::Trap, UnlockAction::Timed(TimedEffect::Suspicious)),
    entry(450, GOLDEN_BELL_SOUL, CapabilityKind::PropSoul, UnlockAction::RevealBucket),
    entry(999, "Golden Bell", CapabilityKind::Milestone, UnlockAction::Flag),
];

/// Order in which Progressive Area grants regions.
pub(crate) const PROGRESSIVE_ORDER: &[Region] = &[
    Region::Garden,
    Region::HighStreet,
    Region::BackGardens,
    Region::Pub,
    Region::ModelVillage,
];

pub(crate) const NPC_SOUL_BASE: i64 = 400;

pub(crate) const NPC_SOULS: &[&str] = &[
    "Groundskeeper Soul",
    "Boy Soul",
    "TV Shop Owner Soul",
    "Market Lady Soul",
    "Tidy Neighbour Soul",
    "Messy Neighbour Soul",
    "Burly Man Soul",
    "Old Man Soul",
    "Pub Lady Soul",
    "Fancy Ladies Soul",
    "Cook Soul",
];

pub(crate) const PROP_SOUL_BASE: i64 = 500;

/// Prop souls in id order. Append only: the position is the item id.
pub(crate) const PROP_SOULS: &[&str] = &[
    "Carrot Soul",
    "Tomato Soul",
    "Pumpkin Soul",
    "Topsoil Bag Soul",
    "Quoit Soul",
    "Plate Soul",
    "Orange Soul",
    "Leek Soul",
    "Cucumber Soul",
    "Dart Soul",
    "Umbrella Soul",
    "Spray Can Soul",
    "Sock Soul",
    "Pint Bottle Soul",
    "Knife Soul",
    "Gumboot Soul",
    "Fork Soul",
    "Vase Piece Soul",
    "Apple Core Soul",
    "Apple Soul",
    "Sandwich Soul",
    "Slipper Soul",
    "Bow Soul",
    "Walkie Talkie Soul",
    "Boot Soul",
    "Mini Person Soul",
    "Radio Soul",
    "Trowel Soul",
    "Keys Soul",
    "Tulip Soul",
    "Jam Soul",
    "Picnic Mug Soul",
    "Thermos Soul",
    "Straw Hat Soul",
    "Drink Can Soul",
    "Tennis Ball Soul",
    "Gardener Hat Soul",
    "Rake Soul",
    "Picnic Basket Soul",
    "Esky Soul",
    "Shovel Soul",
    "Watering Can Soul",
    "Fence Bolt Soul",
    "Mallet Soul",
    "Wooden Crate Soul",
    "Gardener Sign Soul",
    "Boy's Glasses Soul",
    "Horn-Rimmed Glasses Soul",
    "Red Glasses Soul",
    "Sunglasses Soul",
    "Toilet Paper Soul",
    "Toy Car Soul",
    "Hairbrush Soul",
    "Toothbrush Soul",
    "Stereoscope Soul",
    "Dish Soap Bottle Soul",
    "Spray Bottle Soul",
    "Weed Tool Soul",
    "Lily Flower Soul",
    "Fusilage Soul",
    "Coin Soul",
    "Chalk Soul",
    "Dustbin Lid Soul",
    "Shopping Basket Soul",
    "Push Broom Soul",
    "Broken Broom Head Soul",
    "Dustbin Soul",
    "Baby Doll Soul",
    "Pricing Gun Soul",
    "Adding Machine Soul",
    "Dummy Soul",
    "Cricket Ball Soul",
    "Bust Pipe Soul",
    "Bust Hat Soul",
    "Bust Glasses Soul",
    "Tea Cup Soul",
    "Newspaper Soul",
    "Badminton Racket Soul",
    "Pot Stack Soul",
    "Soap Soul",
    "Paintbrush Soul",
    "Vase Soul",
    "Right Strap Soul",
    "Rose Soul",
    "Rose Box Soul",
    "Cricket Bat Soul",
    "Tea Pot Soul",
    "Clippers Soul",
    "Duck Statue Soul",
    "Frog Statue Soul",
    "Jeremy Fish Soul",
    "Messy Sign Soul",
    "Drawer Soul",
    "Enamel Jug Soul",
    "Clean Sign Soul",
    "Fishing Bobber Soul",
    "Exit Letter Soul",
    "Pint Glass Soul",
    "Toy Boat Soul",
    "Wooly Hat Soul",
    "Pepper Grinder Soul",
    "Pub Cloth Soul",
    "Cork Soul",
    "Candlestick Soul",
    "Flower for Vase Soul",
    "Harmonica Soul",
    "Tackle Box Soul",
    "Traffic Cone Soul",
    "Exit Parcel Soul",
    "Stealth Box Soul",
    "No Goose Sign Soul",
    "Portable Stool Soul",
    "Dartboard Soul",
    "Mop Bucket Soul",
    "Mop Soul",
    "Delivery Box Soul",
    "Tomato Box Soul",
    "Mini Mail Pillar Soul",
    "Mini Phone Door Soul",
    "Mini Shovel Soul",
    "Poppy Flower Soul",
    "Timber Handle Soul",
    "Birdbath Soul",
    "Easel Soul",
    "Mini Bench Soul",
    "Mini Pump Soul",
    "Mini Street Bench Soul",
    "Sun Lounge Soul",
    "Burly Mans Bucket Soul",
];
