//! Location tables: goal names, item pickups and milestones. All values are
//! offsets from [`super::BASE_ID`].

use super::Region;

/// Task-list goal name -> location offset.
pub(crate) const GOALS: &[(&str, i64)] = &[
    // Garden
    ("goalGarden", 1),
    ("goalWet", 2),
    ("goalKeys", 3),
    ("goalHat", 4),
    ("goalRake", 5),
    ("goalPicnic", 6),
    ("goalHammering", 7),
    // High Street
    ("goalBroom", 10),
    ("goalPhonebooth", 11),
    ("goalWrongGlasses", 12),
    ("goalBuyBack", 13),
    ("goalGetInShop", 14),
    ("goalShopping", 15),
    ("goalGarage", 16),
    // Back Gardens
    ("goalBreakVase", 20),
    ("goalDressStatue", 21),
    ("goalBell", 22),
    ("goalRibbon", 23),
    ("goalBarefoot", 24),
    ("goalWashing", 25),
    ("goalPrune", 26),
    // Pub
    ("goalIntoPub", 30),
    ("goalOldMan1", 31),
    ("goalBoat", 32),
    ("goalOldMan2", 33),
    ("goalFlower", 34),
    ("goalPintGlass", 35),
    ("goalSetTable", 36),
    ("goalBucket", 37),
    // Model Village
    ("goalModelVillage", 40),
    ("goalStealBell", 41),
    ("goalFinale", 42),
    // To Do (As Well)
    ("goalLockout", 50),
    ("goalCabbage", 51),
    ("goalPuddle", 52),
    ("goalScales", 53),
    ("goalUmbrella", 54),
    ("goalBuyBack2", 55),
    ("goalFlowers", 56),
    ("goalWimpGarage", 60),
    ("goalCatch", 61),
    ("goalThrownGoose", 62),
    ("goalBust2", 63),
    ("goalFootball", 64),
    ("goalBoatBridge", 65),
    ("goalPerformRibbon", 66),
    ("goalOldManHat", 67),
    // Speedrun
    ("goalSpeedyGarden", 70),
    ("goalSpeedyShops", 71),
    ("goalSpeedyBackyards", 72),
    ("goalSpeedyPub", 73),
    ("goal100", 80),
];

/// Goal whose completion is also the session's win condition.
pub(crate) const FINALE_GOAL: &str = "goalFinale";

/// Per-area main task milestones: (region, milestone offset, main task offsets).
pub(crate) const AREA_MILESTONES: &[(Region, i64, &[i64])] = &[
    (Region::Garden, 81, &[1, 2, 3, 4, 5, 6, 7]),
    (Region::HighStreet, 82, &[10, 11, 12, 13, 14, 15, 16]),
    (Region::BackGardens, 83, &[20, 21, 22, 23, 24, 25, 26]),
    (Region::Pub, 84, &[30, 31, 32, 33, 34, 35, 36, 37]),
];

/// Awarded once every area milestone above has been reported.
pub(crate) const ALL_MAIN_MILESTONE: i64 = 88;

/// Lowercased raw object name -> first pickup location offset. Instance
/// suffixes are significant here: each copy is its own location.
pub(crate) const PICKUPS: &[(&str, i64)] = &[
    // Garden
    ("boot", 1001),
    ("radiosmall", 1002),
    ("trowel", 1003),
    ("keys", 1004),
    ("carrot", 1005),
    ("tulip", 1006),
    ("apple", 1007),
    ("jam", 1008),
    ("picnicmug", 1009),
    ("thermos (1)", 1010),
    ("sandwichr", 1011),
    ("sandwichl", 1012),
    ("forkgarden", 1013),
    ("strawhat", 1014),
    ("drinkcan", 1015),
    ("tennisball", 1016),
    ("gardenerhat", 1017),
    ("apple (1)", 1018),
    // High Street
    ("wimpglasses", 1021),
    ("hornrimmedglasses", 1022),
    ("redglasses", 1023),
    ("sunglasses", 1024),
    ("toiletpaper", 1025),
    ("toycar", 1026),
    ("hairbrush", 1027),
    ("toothbrush", 1028),
    ("stereoscope", 1029),
    ("dishwashbottle", 1030),
    ("canblue", 1031),
    ("canyellow", 1032),
    ("canorange", 1033),
    ("weedtool", 1034),
    ("lilyflower", 1035),
    ("orange", 1036),
    ("tomato (1)", 1037),
    ("carrotnogreen (1)", 1038),
    ("cucumber (1)", 1039),
    ("leek (1)", 1040),
    ("fusilage", 1041),
    ("pintbottle", 1042),
    ("spraybottle", 1043),
    ("walkietalkieb", 1044),
    ("walkietalkie", 1045),
    ("applecore", 1046),
    ("dustbinlid", 1047),
    ("pintbottle (1)", 1048),
    ("coin", 1049),
    ("chalk", 1050),
    ("tomato (2)", 1051),
    ("orange (1)", 1052),
    ("orange (2)", 1053),
    ("carrotnogreen (3)", 1054),
    ("cucumber (2)", 1055),
    ("leek (2)", 1056),
    ("carrotnogreen (2)", 1057),
    ("applecore (1)", 1058),
    ("leek (3)", 1059),
    ("tomato (3)", 1060),
    ("cucumber", 1061),
    // Back Gardens
    ("bowprop_b", 1071),
    ("dummyprop", 1072),
    ("cricketball", 1073),
    ("bustpipeprop", 1074),
    ("busthatprop", 1075),
    ("bustglassesprop", 1076),
    ("cleanslipperr", 1077),
    ("cleanslipperl", 1078),
    ("teacup", 1079),
    ("newspaper", 1080),
    ("socksplaceholder", 1081),
    ("socksplaceholder (1)", 1082),
    ("vaseprop", 1083),
    ("bowprop", 1084),
    ("potstack", 1085),
    ("soap", 1086),
    ("paintbrush", 1087),
    ("vasebroken01", 1088),
    ("vasebroken02", 1089),
    ("rightstrap", 1090),
    ("rightstrap (1)", 1091),
    ("rightstrap (2)", 1092),
    ("badmintonracket", 1093),
    // Pub
    ("fishingbobberprop", 1101),
    ("exitletterprop", 1102),
    ("exitletter", 1102),
    ("pubtomato", 1103),
    ("plate", 1104),
    ("plate (1)", 1105),
    ("plate (2)", 1106),
    ("quoitgreen (2)", 1107),
    ("quoitred (1)", 1108),
    ("fork", 1109),
    ("fork (1)", 1110),
    ("knife", 1111),
    ("knife (1)", 1112),
    ("cork", 1113),
    ("candlestick", 1114),
    ("flowerforvase", 1115),
    ("dart1", 1116),
    ("dart2", 1117),
    ("dart3", 1118),
    ("harmonica", 1119),
    ("pintglassprop", 1120),
    ("toyboat", 1121),
    ("woolyhat", 1122),
    ("peppergrinder", 1123),
    ("pubwomancloth", 1124),
    // Model Village
    ("miniperson variant - child", 1131),
    ("miniperson variant - jumpsuit", 1132),
    ("miniperson variant - gardener", 1133),
    ("minishovelprop", 1134),
    ("flowerpoppy", 1135),
    ("miniperson variant - old woman", 1136),
    ("miniphonedoorprop", 1137),
    ("minimailpillarprop", 1138),
    ("miniperson variant - postie", 1139),
    ("miniperson variant - vestman", 1140),
    ("miniperson", 1141),
    ("timberhandleprop", 1142),
    ("goldenbell", 1143),
];
