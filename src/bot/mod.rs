// Release announcer: watches GitHub releases and posts them to Discord.
//
// github: releases API client and latest-release selection
// format: message formatting within Discord's 2000-character limit
// state: the JSON state file (last announced id, @everyone toggle)
// announcer: where posts go (Discord channel via REST)
// watcher: the polling loop tying it together

pub mod announcer;
pub mod format;
pub mod github;
pub mod state;
pub mod watcher;
