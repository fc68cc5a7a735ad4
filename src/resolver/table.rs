//! Matching data for the entity resolver. This is content configuration:
//! check changes with `goosebridge resolve --scene <dump>` against a real scene.

use crate::world::ObjectRole;

/// One normalized key and the bucket it selects.
#[derive(Debug, Clone, Copy)]
pub(crate) struct MatchKey {
    pub key: &'static str,
    pub bucket: &'static str,
    /// Only ever matched exactly; never used by the substring tiers.
    pub exact_only: bool,
}

const fn k(key: &'static str, bucket: &'static str) -> MatchKey {
    MatchKey {
        key,
        bucket,
        exact_only: false,
    }
}

const fn x(key: &'static str, bucket: &'static str) -> MatchKey {
    MatchKey {
        key,
        bucket,
        exact_only: true,
    }
}

/// A bucket made of several physical objects, matched by structural name
/// (lowercased, instancing suffix removed) rather than by the generic tiers.
pub(crate) struct SpecialGroup {
    pub bucket: &'static str,
    pub role: ObjectRole,
    pub names: &'static [&'static str],
}

pub(crate) const SPECIAL_GROUPS: &[SpecialGroup] = &[
    SpecialGroup { bucket: "Groundskeeper Soul", role: ObjectRole::Npc, names: &["gardener brain"] },
    SpecialGroup { bucket: "Boy Soul", role: ObjectRole::Npc, names: &["wimp brain"] },
    SpecialGroup { bucket: "TV Shop Owner Soul", role: ObjectRole::Npc, names: &["tvshop brain"] },
    SpecialGroup { bucket: "Market Lady Soul", role: ObjectRole::Npc, names: &["shopkeeper brain"] },
    SpecialGroup { bucket: "Tidy Neighbour Soul", role: ObjectRole::Npc, names: &["neighbourclean brain"] },
    SpecialGroup { bucket: "Messy Neighbour Soul", role: ObjectRole::Npc, names: &["neighbourmessyfixed brain"] },
    SpecialGroup { bucket: "Burly Man Soul", role: ObjectRole::Npc, names: &["pub man brain"] },
    SpecialGroup { bucket: "Old Man Soul", role: ObjectRole::Npc, names: &["oldman brain"] },
    SpecialGroup { bucket: "Pub Lady Soul", role: ObjectRole::Npc, names: &["pub woman brain"] },
    SpecialGroup { bucket: "Fancy Ladies Soul", role: ObjectRole::Npc, names: &["gossip1 brain", "gossip2 brain"] },
    SpecialGroup { bucket: "Cook Soul", role: ObjectRole::Npc, names: &["cook brain"] },
    SpecialGroup { bucket: "Timber Handle Soul", role: ObjectRole::Prop, names: &["timberhandleprop", "timberhandlehinge"] },
    SpecialGroup { bucket: "Burly Mans Bucket Soul", role: ObjectRole::Prop, names: &["pubmanbucket", "pubmanbuckethandle"] },
    SpecialGroup { bucket: "Drawer Soul", role: ObjectRole::Prop, names: &["drawer", "drawerhandle"] },
    SpecialGroup { bucket: "Esky Soul", role: ObjectRole::Prop, names: &["esky", "eskylid"] },
    SpecialGroup { bucket: "Rose Box Soul", role: ObjectRole::Prop, names: &["rosebox", "roseboxlid"] },
];

/// Normalized prop names that look like candidates but must never be gated.
pub(crate) const IGNORED: &[&str] = &[
    "umbrellastand",
    "carrotpatch",
    "tomatoplant",
    "pumpkinvine",
    "goldenbellplinth",
    "dartboardhook",
    "vaseplinth",
    "plateshelf",
    "boatmooring",
    "applecrate",
];

pub(crate) const PROP_KEYS: &[MatchKey] = &[
    // grouped
    k("carrot", "Carrot Soul"),
    k("tomato", "Tomato Soul"),
    k("pumpkin", "Pumpkin Soul"),
    k("topsoilbag", "Topsoil Bag Soul"),
    k("topsoil", "Topsoil Bag Soul"),
    x("top", "Topsoil Bag Soul"),
    k("quoit", "Quoit Soul"),
    x("plate", "Plate Soul"),
    k("orange", "Orange Soul"),
    k("leek", "Leek Soul"),
    k("cucumber", "Cucumber Soul"),
    x("dart", "Dart Soul"),
    k("umbrella", "Umbrella Soul"),
    k("bluecan", "Spray Can Soul"),
    k("orangecan", "Spray Can Soul"),
    k("yellowcan", "Spray Can Soul"),
    k("canblue", "Spray Can Soul"),
    k("canorange", "Spray Can Soul"),
    k("canyellow", "Spray Can Soul"),
    k("sock", "Sock Soul"),
    k("pintbottle", "Pint Bottle Soul"),
    k("knife", "Knife Soul"),
    k("gumboot", "Gumboot Soul"),
    k("fork", "Fork Soul"),
    k("brokenvasepiece", "Vase Piece Soul"),
    k("brokenbit", "Vase Piece Soul"),
    k("vasebroken", "Vase Piece Soul"),
    k("applecore", "Apple Core Soul"),
    k("apple", "Apple Soul"),
    k("sandwich", "Sandwich Soul"),
    k("slipper", "Slipper Soul"),
    x("bow", "Bow Soul"),
    k("bowprop", "Bow Soul"),
    k("walkietalkie", "Walkie Talkie Soul"),
    k("boot", "Boot Soul"),
    k("miniperson", "Mini Person Soul"),
    // garden
    k("radio", "Radio Soul"),
    k("trowel", "Trowel Soul"),
    k("keys", "Keys Soul"),
    k("keyring", "Keys Soul"),
    k("carkeys", "Keys Soul"),
    k("tulip", "Tulip Soul"),
    x("jam", "Jam Soul"),
    k("picnicmug", "Picnic Mug Soul"),
    k("thermos", "Thermos Soul"),
    k("strawhat", "Straw Hat Soul"),
    k("sunhat", "Straw Hat Soul"),
    k("drinkcan", "Drink Can Soul"),
    k("tennisball", "Tennis Ball Soul"),
    k("gardenerhat", "Gardener Hat Soul"),
    k("gardenershat", "Gardener Hat Soul"),
    k("hatgardener", "Gardener Hat Soul"),
    k("gardenerssunhat", "Gardener Hat Soul"),
    x("rake", "Rake Soul"),
    k("picnicbasket", "Picnic Basket Soul"),
    k("basketprop", "Picnic Basket Soul"),
    k("coolbox", "Esky Soul"),
    k("shovel", "Shovel Soul"),
    k("wateringcan", "Watering Can Soul"),
    k("fencebolt", "Fence Bolt Soul"),
    k("boltbent", "Fence Bolt Soul"),
    k("mallet", "Mallet Soul"),
    k("woodencrate", "Wooden Crate Soul"),
    k("cratewooden", "Wooden Crate Soul"),
    k("gardenersign", "Gardener Sign Soul"),
    // high street
    k("boysglasses", "Boy's Glasses Soul"),
    k("boyglasses", "Boy's Glasses Soul"),
    k("glassesboy", "Boy's Glasses Soul"),
    k("wimpglasses", "Boy's Glasses Soul"),
    k("hornrimmedglasses", "Horn-Rimmed Glasses Soul"),
    k("redglasses", "Red Glasses Soul"),
    k("sunglasses", "Sunglasses Soul"),
    k("toiletpaper", "Toilet Paper Soul"),
    k("toycar", "Toy Car Soul"),
    k("hairbrush", "Hairbrush Soul"),
    k("toothbrush", "Toothbrush Soul"),
    k("stereoscope", "Stereoscope Soul"),
    k("dishsoapbottle", "Dish Soap Bottle Soul"),
    k("dishwashbottle", "Dish Soap Bottle Soul"),
    k("spraybottle", "Spray Bottle Soul"),
    k("weedtool", "Weed Tool Soul"),
    k("lilyflower", "Lily Flower Soul"),
    k("fusilage", "Fusilage Soul"),
    x("coin", "Coin Soul"),
    k("chalk", "Chalk Soul"),
    k("dustbinlid", "Dustbin Lid Soul"),
    k("shoppingbasket", "Shopping Basket Soul"),
    x("basket", "Shopping Basket Soul"),
    k("pushbroom", "Push Broom Soul"),
    k("brokenbroomhead", "Broken Broom Head Soul"),
    k("broomheadseperate", "Broken Broom Head Soul"),
    k("dustbin", "Dustbin Soul"),
    k("babydoll", "Baby Doll Soul"),
    k("pricinggun", "Pricing Gun Soul"),
    k("addingmachine", "Adding Machine Soul"),
    // back gardens
    k("dummy", "Dummy Soul"),
    k("cricketball", "Cricket Ball Soul"),
    k("bustpipe", "Bust Pipe Soul"),
    k("busthat", "Bust Hat Soul"),
    k("bustglasses", "Bust Glasses Soul"),
    k("teacup", "Tea Cup Soul"),
    k("newspaper", "Newspaper Soul"),
    k("badmintonracket", "Badminton Racket Soul"),
    k("potstack", "Pot Stack Soul"),
    k("soap", "Soap Soul"),
    k("paintbrush", "Paintbrush Soul"),
    k("vase", "Vase Soul"),
    k("rightstrap", "Right Strap Soul"),
    x("rose", "Rose Soul"),
    k("cricketbat", "Cricket Bat Soul"),
    k("teapot", "Tea Pot Soul"),
    k("clippers", "Clippers Soul"),
    k("duckstatue", "Duck Statue Soul"),
    k("frogstatue", "Frog Statue Soul"),
    k("jeremyfish", "Jeremy Fish Soul"),
    k("messysign", "Messy Sign Soul"),
    k("enameljug", "Enamel Jug Soul"),
    k("jugenamel", "Enamel Jug Soul"),
    k("cleansign", "Clean Sign Soul"),
    // pub
    k("fishingbobber", "Fishing Bobber Soul"),
    k("exitletter", "Exit Letter Soul"),
    k("pintglass", "Pint Glass Soul"),
    k("toyboat", "Toy Boat Soul"),
    k("woolyhat", "Wooly Hat Soul"),
    k("woollyhat", "Wooly Hat Soul"),
    k("peppergrinder", "Pepper Grinder Soul"),
    k("pubcloth", "Pub Cloth Soul"),
    k("pubwomancloth", "Pub Cloth Soul"),
    x("cork", "Cork Soul"),
    k("candlestick", "Candlestick Soul"),
    k("flowerforvase", "Flower for Vase Soul"),
    k("harmonica", "Harmonica Soul"),
    k("tacklebox", "Tackle Box Soul"),
    k("trafficcone", "Traffic Cone Soul"),
    k("coneprop", "Traffic Cone Soul"),
    k("exitparcel", "Exit Parcel Soul"),
    k("stealthbox", "Stealth Box Soul"),
    k("nogoosesign", "No Goose Sign Soul"),
    k("pubnogoose", "No Goose Sign Soul"),
    k("portablestool", "Portable Stool Soul"),
    k("dartboard", "Dartboard Soul"),
    k("mopbucket", "Mop Bucket Soul"),
    x("pail", "Mop Bucket Soul"),
    x("bucket", "Mop Bucket Soul"),
    x("mop", "Mop Soul"),
    k("deliverybox", "Delivery Box Soul"),
    k("tomatobox", "Tomato Box Soul"),
    // model village
    k("minimailpillar", "Mini Mail Pillar Soul"),
    k("miniphonedoor", "Mini Phone Door Soul"),
    k("minishovel", "Mini Shovel Soul"),
    k("poppyflower", "Poppy Flower Soul"),
    k("flowerpoppy", "Poppy Flower Soul"),
    k("birdbath", "Birdbath Soul"),
    k("easel", "Easel Soul"),
    k("minibench", "Mini Bench Soul"),
    k("minipump", "Mini Pump Soul"),
    k("ministreetbench", "Mini Street Bench Soul"),
    k("streetbench", "Mini Street Bench Soul"),
    k("benchstreet", "Mini Street Bench Soul"),
    k("sunlounge", "Sun Lounge Soul"),
    // victory
    k("goldenbell", "Golden Bell Soul"),
];
