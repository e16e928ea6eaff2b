//! Host and client editors wired together over in-process channels

use mapedit_editor::{ActionKind, Change, Editor, HistoryConfig, LiveRole, ManualClock};
use mapedit_live::{
    apply_remote, receive_broadcast, receive_remote, ChangeRecord, LiveClient, LiveError, LiveHost,
    Region,
};
use mapedit_map::{Item, Map, Position, Tile};

fn editor() -> Editor {
    let config = HistoryConfig {
        group_actions: false,
        ..HistoryConfig::default()
    };
    Editor::with_clock(Map::new(), config, ManualClock::new(1000))
}

fn draw(editor: &mut Editor, position: Position, item: u16) {
    let mut tile = Tile::with_ground(position, 405);
    tile.add_item(Item::new(item));
    let mut action = editor.create_action(ActionKind::Draw);
    action.add_change(Change::tile(tile));
    editor.add_action(action, 0);
}

#[tokio::test]
async fn test_client_edit_reaches_host_and_is_broadcast() -> anyhow::Result<()> {
    let mut host_editor = editor();
    let host = LiveHost::new(16);
    let mut broadcasts = host.subscribe();
    host_editor.set_live(Box::new(host));

    let mut client_editor = editor();
    let (mut client, mut outgoing) = LiveClient::new(false, 16);
    client.view_mut().subscribe(Region::new(0, 0, 63, 63));
    client_editor.set_live(Box::new(client));
    assert_eq!(client_editor.live_role(), LiveRole::Client { read_only: false });

    let position = Position::new(10, 10, 7);
    draw(&mut client_editor, position, 1987);
    assert!(client_editor.can_undo());

    let received = receive_remote(&mut host_editor, &mut outgoing).await?;
    assert_eq!(received, 1);
    assert_eq!(host_editor.map.tile(position).map(|t| t.items[0].id), Some(1987));
    // Remote edits never enter the host's history.
    assert!(!host_editor.can_undo());

    let message = receive_broadcast(&mut broadcasts).await?;
    assert!(message.covers(position));

    // Undo on the client sends the restored (empty) cell.
    client_editor.undo();
    receive_remote(&mut host_editor, &mut outgoing).await?;
    assert!(host_editor.map.tile(position).is_none());
    Ok(())
}

#[tokio::test]
async fn test_client_ignores_remote_edits_out_of_view() {
    let mut client_editor = editor();
    let (mut client, _outgoing) = LiveClient::new(true, 4);
    client.view_mut().subscribe(Region::new(0, 0, 31, 31));
    client_editor.set_live(Box::new(client));

    apply_remote(
        &mut client_editor,
        vec![
            ChangeRecord::Tile {
                tile: Tile::with_ground(Position::new(4, 4, 7), 405),
            },
            ChangeRecord::Tile {
                tile: Tile::with_ground(Position::new(400, 4, 7), 405),
            },
        ],
    );

    assert!(client_editor.map.tile(Position::new(4, 4, 7)).is_some());
    assert!(client_editor.map.tile(Position::new(400, 4, 7)).is_none());

    // Read-only: local drawing is refused.
    draw(&mut client_editor, Position::new(5, 5, 7), 1987);
    assert!(client_editor.map.tile(Position::new(5, 5, 7)).is_none());
}

#[tokio::test]
async fn test_closed_channels_report_disconnect() {
    let mut host_editor = editor();
    let (client, mut outgoing) = LiveClient::new(false, 4);
    drop(client);
    assert!(matches!(
        receive_remote(&mut host_editor, &mut outgoing).await,
        Err(LiveError::Disconnected)
    ));

    let host = LiveHost::new(4);
    let mut broadcasts = host.subscribe();
    drop(host);
    assert!(matches!(
        receive_broadcast(&mut broadcasts).await,
        Err(LiveError::Disconnected)
    ));
}
