// Record id generation. nanoid, 21 characters.

pub fn generate_id() -> String {
    nanoid::nanoid!()
}
