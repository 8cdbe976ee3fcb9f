pub mod update_account;
