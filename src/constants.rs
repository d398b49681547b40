pub mod images {

    pub const DEFAULT_PROFILE_IMAGE: &str = "/static/images/default-pic.svg";

    pub const DEFAULT_HEADER_IMAGE: &str = "/static/images/warbler-hero.svg";
}

pub mod limits {

    /// Rows shown on the homepage feed and on a profile page.
    pub const FEED_LIMIT: u64 = 100;

    pub const MESSAGE_MAX_CHARS: usize = 140;

    pub const PASSWORD_MIN_CHARS: usize = 6;
}

pub mod session {

    /// Session key holding the logged-in user's id.
    pub const CURR_USER_KEY: &str = "curr_user";

    pub const FLASH_KEY: &str = "_flashes";
}
