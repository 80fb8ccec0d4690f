//! Maps a user's stored key slots onto `amtbrief_llm::UserKeys` using the
//! configured slot→family mapping.

use amtbrief_core::config::SlotProvider;
use amtbrief_llm::UserKeys;
use amtbrief_users::User;

pub fn build_user_keys(user: &User, slot_mapping: &[SlotProvider; 3]) -> UserKeys {
    let slots = [
        user.api_key_slot_1
            .clone()
            .map(|key| (slot_mapping[0].family(), key)),
        user.api_key_slot_2
            .clone()
            .map(|key| (slot_mapping[1].family(), key)),
        user.api_key_slot_3
            .clone()
            .map(|key| (slot_mapping[2].family(), key)),
    ];
    UserKeys { slots }
}
