//! Typed path and parameter names for the indexing service API.
//!
//! <https://github.com/LiskHQ/lisk-service/blob/development/docs/api/version2.md>

pub mod accounts {
    pub const PATH: &str = "/api/v2/accounts";

    pub mod filter {
        pub const ADDRESS: &str = "address";
        pub const PUBLIC_KEY: &str = "publicKey";
        pub const USERNAME: &str = "username";
        pub const IS_DELEGATE: &str = "isDelegate";
        pub const STATUS: &str = "status";
        pub const SEARCH: &str = "search";
        pub const LIMIT: &str = "limit";
        pub const OFFSET: &str = "offset";
        pub const SORT: &str = "sort";
    }

    pub mod sort_by {
        pub const BALANCE_ASC: &str = "balance:asc";
        pub const BALANCE_DESC: &str = "balance:desc";
        pub const RANK_ASC: &str = "rank:asc";
        pub const RANK_DESC: &str = "rank:desc";
    }
}

pub mod blocks {
    pub const PATH: &str = "/api/v2/blocks";

    pub mod filter {
        pub const BLOCK_ID: &str = "blockId";
        pub const HEIGHT: &str = "height";
        pub const TIMESTAMP: &str = "timestamp";
        pub const LIMIT: &str = "limit";
        pub const SORT: &str = "sort";
    }

    pub mod sort_by {
        pub const HEIGHT_ASC: &str = "height:asc";
        pub const HEIGHT_DESC: &str = "height:desc";
        pub const TIMESTAMP_ASC: &str = "timestamp:asc";
        pub const TIMESTAMP_DESC: &str = "timestamp:desc";
    }
}

pub mod transactions {
    pub const PATH: &str = "/api/v2/transactions";

    pub mod filter {
        pub const SENDER_ADDRESS: &str = "senderAddress";
        pub const RECIPIENT_ADDRESS: &str = "recipientAddress";
        pub const BLOCK_ID: &str = "blockId";
        pub const TIMESTAMP: &str = "timestamp";
        pub const LIMIT: &str = "limit";
        pub const SORT: &str = "sort";
    }

    pub mod sort_by {
        pub const TIMESTAMP_ASC: &str = "timestamp:asc";
        pub const TIMESTAMP_DESC: &str = "timestamp:desc";
    }
}

pub mod peers {
    pub const PATH: &str = "/api/v2/peers";
}

pub mod fees {
    pub const PATH: &str = "/api/v2/fees";
}

pub mod network {
    pub const STATUS_PATH: &str = "/api/v2/network/status";
    pub const STATISTICS_PATH: &str = "/api/v2/network/statistics";
}

pub mod votes_sent {
    pub const PATH: &str = "/api/v2/votes_sent";

    pub mod filter {
        pub const ADDRESS: &str = "address";
        pub const PUBLIC_KEY: &str = "publicKey";
        pub const USERNAME: &str = "username";
    }
}

pub mod votes_received {
    pub const PATH: &str = "/api/v2/votes_received";

    pub mod filter {
        pub const ADDRESS: &str = "address";
        pub const PUBLIC_KEY: &str = "publicKey";
        pub const USERNAME: &str = "username";
        pub const AGGREGATE: &str = "aggregate";
        pub const LIMIT: &str = "limit";
        pub const OFFSET: &str = "offset";
    }
}

pub mod forgers {
    pub const PATH: &str = "/api/v2/forgers";

    pub mod filter {
        pub const LIMIT: &str = "limit";
        pub const OFFSET: &str = "offset";
    }
}
