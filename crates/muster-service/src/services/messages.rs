//! Fixed message templates sent by the onboarding workflow

/// Posted into a new member's onboarding channel
pub fn welcome(mention: &str) -> String {
    let heading = format!("# Welcome to Unnamed Arma Group, {mention}!");
    [
        heading.as_str(),
        "I'm a bot designed to help run the unit. If you have any questions, feel free to ask a human in the members list!",
        "Due to our community being private, we require all new members to go through a short introduction process. This is to ensure that you're a good fit for our community and that we're a good fit for you!",
        "Please introduce yourself in this channel, and a member of staff will be with you shortly! We recommend you answer the following questions, ordered by importance:",
        "> 1. What is your name?",
        "> 2. How old are you?",
        "> 3. Where are you from?",
        "> 4. Have you ever played in an Arma unit before?",
        "> 5. Do you have experience with the [ACE3](<https://ace3.acemod.org/>) and [ACRE2](<https://steamcommunity.com/workshop/filedetails/?id=751965892>) mods?",
        "> 6. How did you find us?",
    ]
    .join("\n")
}

/// Direct message sent to a member who left
pub fn farewell(mention: &str, rejoin_url: &str) -> String {
    format!(
        "# It looks like you've left Unnamed Arma Group!\n\nGoodbye, {mention}!\n\nWe're all sorry to see you go! If you ever change your mind, you can always rejoin by clicking [here]({rejoin_url})."
    )
}

/// Direct message sent to every recruiter when someone joins
pub fn join_notification(channel_url: &str) -> String {
    format!("A new member has joined the server: {channel_url}")
}
