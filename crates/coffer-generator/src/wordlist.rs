// SPDX-FileCopyrightText: 2026 Coffer Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

/// Distinct lowercase words. Each pick adds 8 bits of entropy.
pub(crate) const WORDS: [&str; 256] = [
    "acorn", "actor", "agent", "alarm", "album", "alley", "amber", "anchor",
    "angle", "ankle", "apple", "april", "apron", "arena", "armor", "arrow",
    "atlas", "attic", "autumn", "avenue", "badge", "bagel", "baker", "bamboo",
    "banjo", "barrel", "basil", "basket", "beacon", "beetle", "bench", "berry",
    "bicycle", "bishop", "blade", "blanket", "blossom", "bonnet", "border", "bottle",
    "bounce", "branch", "breeze", "brick", "bridge", "bronze", "bucket", "buffalo",
    "bundle", "butter", "cabin", "cactus", "camel", "candle", "canoe", "canvas",
    "carbon", "carpet", "castle", "cedar", "celery", "cellar", "chalk", "cherry",
    "chimney", "cinder", "circus", "citrus", "clover", "cobalt", "coconut", "comet",
    "copper", "coral", "cotton", "cousin", "coyote", "crane", "crayon", "cricket",
    "crystal", "cupboard", "dagger", "daisy", "dancer", "denim", "desert", "dinner",
    "dolphin", "domino", "donkey", "dragon", "drawer", "drum", "eagle", "easel",
    "echo", "elbow", "ember", "engine", "falcon", "feather", "fender", "fiddle",
    "fig", "finch", "flannel", "flute", "forest", "fossil", "fountain", "fox",
    "gadget", "galaxy", "garden", "garlic", "gazelle", "geyser", "ginger", "glacier",
    "goblet", "granite", "grape", "gravel", "guitar", "hammer", "harbor", "hazel",
    "helmet", "heron", "hickory", "honey", "hornet", "husky", "igloo", "indigo",
    "iris", "island", "ivory", "jacket", "jaguar", "jasmine", "jelly", "jigsaw",
    "jungle", "kayak", "kernel", "kettle", "kiwi", "koala", "ladder", "lagoon",
    "lantern", "laptop", "lemon", "lentil", "lily", "linen", "lizard", "lobster",
    "locket", "magnet", "mango", "maple", "marble", "meadow", "melon", "mesa",
    "meteor", "mirror", "mitten", "monsoon", "mosaic", "muffin", "mustard", "napkin",
    "nectar", "needle", "nickel", "nutmeg", "oasis", "ocean", "olive", "onion",
    "orbit", "orchid", "otter", "oyster", "paddle", "pancake", "panda", "paprika",
    "parcel", "parrot", "pebble", "pepper", "pickle", "pigeon", "pillow", "pilot",
    "pine", "planet", "plum", "pocket", "poppy", "prairie", "pretzel", "pumpkin",
    "puzzle", "quartz", "quill", "rabbit", "radar", "raft", "raisin", "raven",
    "ribbon", "river", "rocket", "saddle", "saffron", "salmon", "sandal", "satin",
    "scarf", "sequoia", "shadow", "shovel", "silver", "sketch", "sloth", "socket",
    "sparrow", "spinach", "spruce", "squid", "stable", "summit", "sunset", "tablet",
    "teapot", "thimble", "thistle", "ticket", "tiger", "timber", "toast", "tomato",
    "topaz", "tractor", "trumpet", "tulip", "tundra", "turnip", "umbrella", "velvet",
];
