/// Wrap a submitter prompt in the tiny home architectural render template.
pub fn enrich(prompt: &str) -> String {
    format!(
        "A photorealistic architectural visualization of a tiny home: {prompt}. \
         Include details of structure, materials, and surroundings. \
         Make it look like a professional architectural render suitable for a blueprint."
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn embeds_prompt_in_template() {
        let enriched = enrich("A cabin in the woods");
        assert!(enriched.starts_with(
            "A photorealistic architectural visualization of a tiny home: A cabin in the woods."
        ));
        assert!(enriched.ends_with("suitable for a blueprint."));
    }
}
