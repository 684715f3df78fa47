use tokio_repeat::repeat;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // three beeps, half a second apart
    let mut beeper = repeat(|call| async move {
        println!("beep {call}");
        Ok(())
    });
    beeper.every("500ms").repeat(3).await.unwrap();
    println!("beeping took {:?}", beeper.run_time().unwrap());

    // keep polling until the fifth attempt
    let mut poller = repeat(|call| async move {
        println!("polling, attempt {call}");
        Ok(())
    });
    poller.every(200_u64).until(|calls: u64| calls >= 5).await.unwrap();
    println!("polling took {:?}", poller.run_time().unwrap());
}
